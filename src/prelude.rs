//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use ayur_remedy::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{AyurError, Result};

// Client
pub use crate::client::{
    AnalysisResult, ApiError, ConfidenceTier, Dosha, HttpTransport, Recommendation, RemedyApi,
};

// Session
pub use crate::session::{
    ConnectivityStatus, NullSessionObserver, SessionModel, SessionObserver, SessionRuntime,
    UiState,
};

// Logger
pub use crate::logger::{JsonlRequestObserver, MemoryRequestObserver, RequestObserver};

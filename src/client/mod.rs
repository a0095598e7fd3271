//! Transport client for the remote analysis service.
//!
//! Three endpoints, one failure shape: everything below this module is
//! normalized into [`ApiError`] before it reaches the session controller.

pub mod error;
pub mod models;
pub mod transport;

pub use error::ApiError;
pub use models::{AnalysisResult, ConfidenceTier, Dosha, Recommendation};
pub use transport::{HealthPayload, HttpTransport, RemedyApi};

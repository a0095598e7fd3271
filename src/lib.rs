#![forbid(unsafe_code)]

//! ayur_remedy: terminal client for an Ayurvedic symptom-analysis service.
//!
//! Three layers:
//! 1. **Transport** ([`client`]): health, symptom vocabulary, and analysis
//!    calls over HTTP, with every failure normalized into one error shape
//! 2. **Session** ([`session`]): Elm-style controller owning connectivity,
//!    request state, and autocomplete over the fetched vocabulary
//! 3. **Diagnostics** ([`logger`]): request observers and a JSONL log
//!
//! # Library usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ayur_remedy::prelude::*;
//!
//! let config = Config::load(None)?;
//! let api = Arc::new(HttpTransport::new(&config.api)?);
//! let mut session = SessionRuntime::new(api, &config.session);
//! session.initialize();
//! let state = session.submit_and_wait("fever and chills");
//! println!("{}", state.tag());
//! # Ok::<(), AyurError>(())
//! ```

pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod core;
pub mod logger;
pub mod session;

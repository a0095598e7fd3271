//! User-facing transport failures.

#![allow(missing_docs)]

use thiserror::Error;

/// Shown when the health check cannot reach the service.
pub const CONNECTIVITY_MESSAGE: &str = "Failed to connect to server";
/// Shown when an analysis fails without a server-provided message.
pub const GENERIC_ANALYSIS_MESSAGE: &str = "Failed to analyze symptoms. Please try again.";
/// Logged when the suggestion vocabulary degrades to empty.
pub const SUGGESTION_FETCH_MESSAGE: &str = "Failed to load symptom suggestions";

/// Every failure the controller can observe from the transport.
///
/// `Display` is the exact text shown to the user; `details` fields carry the
/// lower-level cause for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Connectivity { details: String },

    #[error("{}", SUGGESTION_FETCH_MESSAGE)]
    SuggestionFetch { details: String },

    #[error("{message}")]
    Analysis { message: String },
}

impl ApiError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Connectivity { .. } => "AYR-2001",
            Self::SuggestionFetch { .. } => "AYR-2002",
            Self::Analysis { .. } => "AYR-2003",
        }
    }

    pub fn connectivity(details: impl Into<String>) -> Self {
        Self::Connectivity {
            details: details.into(),
        }
    }

    pub fn generic_analysis() -> Self {
        Self::Analysis {
            message: GENERIC_ANALYSIS_MESSAGE.to_string(),
        }
    }
}

//! AYR-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, AyurError>;

/// Top-level error type for the remedy client.
///
/// Transport failures have their own user-facing type,
/// [`ApiError`](crate::client::ApiError); this enum covers everything around
/// it (configuration and local I/O).
#[derive(Debug, Error)]
pub enum AyurError {
    #[error("[AYR-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[AYR-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[AYR-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[AYR-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[AYR-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl AyurError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "AYR-1001",
            Self::MissingConfig { .. } => "AYR-1002",
            Self::ConfigParse { .. } => "AYR-1003",
            Self::Io { .. } => "AYR-3002",
            Self::Runtime { .. } => "AYR-3900",
        }
    }
}

impl From<toml::de::Error> for AyurError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

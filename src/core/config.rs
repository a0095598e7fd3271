//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{AyurError, Result};

/// Default remote service base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Upper bound accepted for `api.timeout_ms` (five minutes).
const MAX_TIMEOUT_MS: u64 = 300_000;

/// Full client configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Remote analysis service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; endpoint paths (`/api/...`) are appended to it.
    pub base_url: String,
    /// Per-request timeout covering connect, send and body read.
    pub timeout_ms: u64,
}

/// Controller knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Delay before the one-shot "results ready" cue fires.
    pub results_cue_delay_ms: u64,
    /// Visual guidance for symptom text length. Never enforced.
    pub input_soft_limit: usize,
}

/// Request diagnostics log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub jsonl_path: PathBuf,
    /// Write log lines to stderr when the JSONL file cannot be opened.
    pub fallback_to_stderr: bool,
}

/// Filesystem paths used by ayur.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            results_cue_delay_ms: 100,
            input_soft_limit: 500,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl_path: data_dir().join("requests.jsonl"),
            fallback_to_stderr: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: home_dir()
                .join(".config")
                .join("ayur")
                .join("config.toml"),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn results_cue_delay(&self) -> Duration {
        Duration::from_millis(self.results_cue_delay_ms)
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| AyurError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(AyurError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Replace the base URL (e.g. from `--api-url`) and re-validate.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        base_url.clone_into(&mut self.api.base_url);
        self.normalize();
        self.validate()?;
        Ok(self)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // api
        if let Some(raw) = lookup("AYUR_API_BASE_URL") {
            self.api.base_url = raw.trim().to_string();
        }
        if let Some(raw) = lookup("AYUR_API_TIMEOUT_MS") {
            self.api.timeout_ms = parse_env_u64("AYUR_API_TIMEOUT_MS", &raw)?;
        }

        // session
        if let Some(raw) = lookup("AYUR_SESSION_RESULTS_CUE_DELAY_MS") {
            self.session.results_cue_delay_ms =
                parse_env_u64("AYUR_SESSION_RESULTS_CUE_DELAY_MS", &raw)?;
        }

        // logging
        if let Some(raw) = lookup("AYUR_LOGGING_ENABLED") {
            self.logging.enabled = parse_env_bool("AYUR_LOGGING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("AYUR_LOGGING_JSONL_PATH") {
            self.logging.jsonl_path = PathBuf::from(raw);
        }

        Ok(())
    }

    fn normalize(&mut self) {
        while self.api.base_url.len() > 1 && self.api.base_url.ends_with('/') {
            self.api.base_url.pop();
        }
    }

    fn validate(&self) -> Result<()> {
        let url = &self.api.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AyurError::InvalidConfig {
                details: format!("api.base_url must start with http:// or https://, got {url:?}"),
            });
        }

        if self.api.timeout_ms == 0 || self.api.timeout_ms > MAX_TIMEOUT_MS {
            return Err(AyurError::InvalidConfig {
                details: format!(
                    "api.timeout_ms must be in 1..={MAX_TIMEOUT_MS}, got {}",
                    self.api.timeout_ms
                ),
            });
        }

        if self.session.input_soft_limit == 0 {
            return Err(AyurError::InvalidConfig {
                details: "session.input_soft_limit must be > 0".to_string(),
            });
        }

        if self.logging.enabled && self.logging.jsonl_path.as_os_str().is_empty() {
            return Err(AyurError::InvalidConfig {
                details: "logging.jsonl_path must be set when logging.enabled=true".to_string(),
            });
        }

        Ok(())
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[AYR-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("ayur")
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|error| AyurError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim()
        .parse::<bool>()
        .map_err(|error| AyurError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

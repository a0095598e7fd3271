//! Blocking HTTP transport for the three analysis-service endpoints.

#![allow(missing_docs)]

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

use super::error::ApiError;
use super::models::{AnalysisRequest, AnalysisResult, ErrorPayload, SuggestionsPayload};
use crate::core::config::ApiConfig;
use crate::core::errors::{AyurError, Result};
use crate::logger::{NullRequestObserver, RequestObserver};

pub const HEALTH_PATH: &str = "/api/health";
pub const SUGGESTIONS_PATH: &str = "/api/symptoms-suggestions";
pub const ANALYZE_PATH: &str = "/api/analyze-symptoms";

/// Opaque health payload; `Null` when the body is not JSON.
pub type HealthPayload = Value;

/// Remote operations the session controller depends on.
///
/// Implementations translate every lower-level failure into [`ApiError`];
/// callers never see raw transport errors.
pub trait RemedyApi: Send + Sync {
    /// Succeeds on any 2xx from the health endpoint.
    fn health_check(&self) -> std::result::Result<HealthPayload, ApiError>;

    /// Known symptom vocabulary; empty on any failure.
    fn fetch_suggestions(&self) -> Vec<String>;

    /// Analyze free-text symptoms. `text` is expected to be non-empty after
    /// trimming; this is not re-checked here.
    fn analyze_symptoms(&self, text: &str) -> std::result::Result<AnalysisResult, ApiError>;
}

impl<T: RemedyApi + ?Sized> RemedyApi for Arc<T> {
    fn health_check(&self) -> std::result::Result<HealthPayload, ApiError> {
        (**self).health_check()
    }

    fn fetch_suggestions(&self) -> Vec<String> {
        (**self).fetch_suggestions()
    }

    fn analyze_symptoms(&self, text: &str) -> std::result::Result<AnalysisResult, ApiError> {
        (**self).analyze_symptoms(text)
    }
}

/// [`RemedyApi`] over HTTP using one shared blocking `reqwest` client.
///
/// No caching, retries, or de-duplication: every call is a fresh request.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    observer: Arc<dyn RequestObserver>,
}

impl HttpTransport {
    /// Build a transport with the configured base URL and timeout.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .user_agent(concat!("ayur/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AyurError::Runtime {
                details: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            observer: Arc::new(NullRequestObserver),
        })
    }

    /// Attach a diagnostics observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send and report request/response/failure to the observer.
    fn send(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> std::result::Result<Response, String> {
        self.observer.on_request(method, path);
        match request.send() {
            Ok(response) => {
                self.observer
                    .on_response(method, path, response.status().as_u16());
                Ok(response)
            }
            Err(e) => {
                let details = e.to_string();
                self.observer.on_failure(method, path, &details);
                Err(details)
            }
        }
    }

    fn read_body(&self, method: &str, path: &str, response: Response) -> Option<Vec<u8>> {
        match response.bytes() {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                self.observer
                    .on_failure(method, path, &format!("body read failed: {e}"));
                None
            }
        }
    }

    fn try_fetch_suggestions(&self) -> std::result::Result<Vec<String>, ApiError> {
        let degraded = |details: String| ApiError::SuggestionFetch { details };

        let response = self
            .send("GET", SUGGESTIONS_PATH, self.client.get(self.url(SUGGESTIONS_PATH)))
            .map_err(degraded)?;
        let status = response.status();
        if !status.is_success() {
            return Err(degraded(format!("HTTP {status}")));
        }
        let body = self
            .read_body("GET", SUGGESTIONS_PATH, response)
            .ok_or_else(|| degraded("body read failed".to_string()))?;
        let payload: SuggestionsPayload = serde_json::from_slice(&body)
            .map_err(|e| degraded(format!("malformed payload: {e}")))?;
        Ok(payload.suggestions.unwrap_or_default())
    }

    fn analysis_failure(&self, status: StatusCode, body: Option<&[u8]>) -> ApiError {
        let message = body
            .and_then(|b| serde_json::from_slice::<ErrorPayload>(b).ok())
            .and_then(|p| p.error)
            .filter(|m| !m.is_empty());
        if message.is_none() {
            self.observer.on_failure(
                "POST",
                ANALYZE_PATH,
                &format!("HTTP {status} without error message"),
            );
        }
        message.map_or_else(ApiError::generic_analysis, |message| ApiError::Analysis {
            message,
        })
    }
}

impl RemedyApi for HttpTransport {
    fn health_check(&self) -> std::result::Result<HealthPayload, ApiError> {
        let response = self
            .send("GET", HEALTH_PATH, self.client.get(self.url(HEALTH_PATH)))
            .map_err(ApiError::connectivity)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::connectivity(format!("HTTP {status}")));
        }
        let body = self
            .read_body("GET", HEALTH_PATH, response)
            .ok_or_else(|| ApiError::connectivity("body read failed"))?;
        Ok(serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn fetch_suggestions(&self) -> Vec<String> {
        match self.try_fetch_suggestions() {
            Ok(suggestions) => suggestions,
            Err(e) => {
                let details = match &e {
                    ApiError::SuggestionFetch { details } => details.clone(),
                    other => other.to_string(),
                };
                self.observer.on_suggestions_degraded(&details);
                Vec::new()
            }
        }
    }

    fn analyze_symptoms(&self, text: &str) -> std::result::Result<AnalysisResult, ApiError> {
        let body = AnalysisRequest {
            symptoms: text.trim(),
        };
        let request = self.client.post(self.url(ANALYZE_PATH)).json(&body);
        let response = self
            .send("POST", ANALYZE_PATH, request)
            .map_err(|_| ApiError::generic_analysis())?;

        let status = response.status();
        let bytes = self.read_body("POST", ANALYZE_PATH, response);

        if !status.is_success() {
            return Err(self.analysis_failure(status, bytes.as_deref()));
        }

        let bytes = bytes.ok_or_else(ApiError::generic_analysis)?;
        serde_json::from_slice::<AnalysisResult>(&bytes).map_err(|e| {
            self.observer
                .on_failure("POST", ANALYZE_PATH, &format!("malformed payload: {e}"));
            ApiError::generic_analysis()
        })
    }
}

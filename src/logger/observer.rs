//! Request observers: diagnostic hooks invoked around every remote call.
//!
//! Observers see method, path and status but never influence control flow.

#![allow(missing_docs)]

use std::sync::Arc;

use parking_lot::Mutex;

use super::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

/// Diagnostic sink for transport activity.
pub trait RequestObserver: Send + Sync {
    /// A request is about to be sent.
    fn on_request(&self, method: &str, path: &str);

    /// A response arrived (any status).
    fn on_response(&self, method: &str, path: &str, status: u16);

    /// The request failed before a response arrived, or the body was unusable.
    fn on_failure(&self, method: &str, path: &str, details: &str);

    /// The suggestion vocabulary degraded to empty.
    fn on_suggestions_degraded(&self, details: &str) {
        let _ = details;
    }
}

/// Observer that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRequestObserver;

impl RequestObserver for NullRequestObserver {
    fn on_request(&self, _method: &str, _path: &str) {}
    fn on_response(&self, _method: &str, _path: &str, _status: u16) {}
    fn on_failure(&self, _method: &str, _path: &str, _details: &str) {}
}

/// Observer that appends every event to a JSONL file.
pub struct JsonlRequestObserver {
    writer: Mutex<JsonlWriter>,
}

impl JsonlRequestObserver {
    pub fn open(config: JsonlConfig) -> Self {
        Self {
            writer: Mutex::new(JsonlWriter::open(config)),
        }
    }

    fn write(&self, entry: &LogEntry) {
        self.writer.lock().write_entry(entry);
    }
}

impl RequestObserver for JsonlRequestObserver {
    fn on_request(&self, method: &str, path: &str) {
        self.write(&LogEntry::new(EventType::ApiRequest, Severity::Info).with_route(method, path));
    }

    fn on_response(&self, method: &str, path: &str, status: u16) {
        let severity = if (200..300).contains(&status) {
            Severity::Info
        } else {
            Severity::Warning
        };
        self.write(
            &LogEntry::new(EventType::ApiResponse, severity)
                .with_route(method, path)
                .with_status(status),
        );
    }

    fn on_failure(&self, method: &str, path: &str, details: &str) {
        self.write(
            &LogEntry::new(EventType::ApiFailure, Severity::Error)
                .with_route(method, path)
                .with_details(details),
        );
    }

    fn on_suggestions_degraded(&self, details: &str) {
        self.write(
            &LogEntry::new(EventType::SuggestionsDegraded, Severity::Warning).with_details(details),
        );
    }
}

/// One event captured by [`MemoryRequestObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    Request {
        method: String,
        path: String,
    },
    Response {
        method: String,
        path: String,
        status: u16,
    },
    Failure {
        method: String,
        path: String,
        details: String,
    },
    SuggestionsDegraded {
        details: String,
    },
}

impl ObservedEvent {
    /// One-line rendering used by `--verbose`.
    pub fn summary(&self) -> String {
        match self {
            Self::Request { method, path } => format!("API Request: {method} {path}"),
            Self::Response {
                method,
                path,
                status,
            } => format!("API Response: {status} {method} {path}"),
            Self::Failure {
                method,
                path,
                details,
            } => format!("API Error: {method} {path}: {details}"),
            Self::SuggestionsDegraded { details } => {
                format!("Failed to load symptom suggestions: {details}")
            }
        }
    }
}

/// In-memory recorder; cheap to clone, all clones share one buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryRequestObserver {
    events: Arc<Mutex<Vec<ObservedEvent>>>,
}

impl MemoryRequestObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<ObservedEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn push(&self, event: ObservedEvent) {
        self.events.lock().push(event);
    }
}

impl RequestObserver for MemoryRequestObserver {
    fn on_request(&self, method: &str, path: &str) {
        self.push(ObservedEvent::Request {
            method: method.to_string(),
            path: path.to_string(),
        });
    }

    fn on_response(&self, method: &str, path: &str, status: u16) {
        self.push(ObservedEvent::Response {
            method: method.to_string(),
            path: path.to_string(),
            status,
        });
    }

    fn on_failure(&self, method: &str, path: &str, details: &str) {
        self.push(ObservedEvent::Failure {
            method: method.to_string(),
            path: path.to_string(),
            details: details.to_string(),
        });
    }

    fn on_suggestions_degraded(&self, details: &str) {
        self.push(ObservedEvent::SuggestionsDegraded {
            details: details.to_string(),
        });
    }
}

/// Fan-out to several observers in registration order.
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn RequestObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl RequestObserver for ObserverSet {
    fn on_request(&self, method: &str, path: &str) {
        for o in &self.observers {
            o.on_request(method, path);
        }
    }

    fn on_response(&self, method: &str, path: &str, status: u16) {
        for o in &self.observers {
            o.on_response(method, path, status);
        }
    }

    fn on_failure(&self, method: &str, path: &str, details: &str) {
        for o in &self.observers {
            o.on_failure(method, path, details);
        }
    }

    fn on_suggestions_degraded(&self, details: &str) {
        for o in &self.observers {
            o.on_suggestions_degraded(details);
        }
    }
}

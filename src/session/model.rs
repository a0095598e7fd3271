//! Elm-style state model for a remedy lookup session.
//!
//! All session state lives in [`SessionModel`]. User actions and settled
//! remote calls arrive as [`SessionMsg`] values; side-effects are represented
//! as [`SessionCmd`] values returned from the update function.
//!
//! **Design invariant:** the model is deterministic and testable; no I/O
//! happens here.

use std::time::Duration;

use serde::Serialize;

use crate::client::{AnalysisResult, ApiError};

use super::suggest;

// ──────────────────── connectivity ────────────────────

/// Reachability of the analysis service, as last reported by a health check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityStatus {
    /// A health check is outstanding.
    #[default]
    Checking,
    /// The last health check succeeded.
    Online,
    /// The last health check failed or timed out.
    Offline,
}

impl ConnectivityStatus {
    /// Badge text for the status indicator.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Checking => "Connecting...",
            Self::Online => "Connected",
            Self::Offline => "Offline",
        }
    }
}

// ──────────────────── ui state ────────────────────

/// What the results area is showing. Exactly one variant is active, so a
/// pending request can never coexist with a result or an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum UiState {
    /// Nothing submitted yet, or the last outcome was dismissed.
    #[default]
    Idle,
    /// An analysis is in flight.
    Loading,
    /// The last analysis returned recommendations.
    Success(AnalysisResult),
    /// Exact user-facing message from the transport.
    Error(String),
}

impl UiState {
    /// Whether an analysis is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The result being shown, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Success(result) => Some(result),
            _ => None,
        }
    }

    /// The error message being shown, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Short machine-readable tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }
}

// ──────────────────── model ────────────────────

/// Complete session state, owned by one controller.
#[derive(Debug, Clone)]
pub struct SessionModel {
    /// Service reachability shown in the status badge.
    pub connectivity: ConnectivityStatus,
    /// Request lifecycle of the results area.
    pub ui: UiState,
    /// Fetched once per session; empty when the fetch degraded.
    pub vocabulary: Vec<String>,
    /// Whether the vocabulary fetch has settled (successfully or not).
    pub vocabulary_loaded: bool,
    /// Symptoms the service extracted from the last successful analysis.
    pub extracted_symptoms: Vec<String>,
    /// Current contents of the symptom input.
    pub input: String,
    /// Length guidance for `input`.
    pub input_soft_limit: usize,
    /// Delay before the results cue fires.
    pub results_cue_delay: Duration,
    /// Set between a successful analysis and its results cue.
    pub results_cue_pending: bool,
    /// Analyze commands emitted over the session lifetime.
    pub analyses_issued: u64,
    /// Health-check commands emitted over the session lifetime.
    pub health_checks_issued: u64,
}

impl SessionModel {
    /// Fresh session: checking connectivity, idle, empty vocabulary.
    pub fn new(input_soft_limit: usize, results_cue_delay: Duration) -> Self {
        Self {
            connectivity: ConnectivityStatus::Checking,
            ui: UiState::Idle,
            vocabulary: Vec::new(),
            vocabulary_loaded: false,
            extracted_symptoms: Vec::new(),
            input: String::new(),
            input_soft_limit,
            results_cue_delay,
            results_cue_pending: false,
            analyses_issued: 0,
            health_checks_issued: 0,
        }
    }

    /// Autocomplete candidates for the current input.
    pub fn suggestions(&self) -> Vec<String> {
        suggest::filter(&self.input, &self.vocabulary)
    }

    /// Character count of the input, for `n/limit` guidance.
    pub fn input_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Whether the input exceeds the length guidance. Never blocks a submit.
    pub fn over_soft_limit(&self) -> bool {
        self.input_len() > self.input_soft_limit
    }

    /// Whether a submit of the current input would be accepted.
    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty() && !self.ui.is_loading()
    }
}

impl Default for SessionModel {
    fn default() -> Self {
        Self::new(500, Duration::from_millis(100))
    }
}

// ──────────────────── messages ────────────────────

/// Inputs to the update function.
#[derive(Debug, Clone)]
pub enum SessionMsg {
    /// Session start: probe the service and load the vocabulary.
    Init,
    /// The symptom input was edited.
    InputChanged(String),
    /// A suggestion was picked for the word being typed.
    AcceptSuggestion(String),
    /// A common-symptom chip was picked.
    QuickAdd(String),
    /// The input was cleared.
    ClearInput,
    /// Analyze the given text.
    Submit(String),
    /// Dismiss the current error/result and re-probe the service.
    Retry,
    /// A health check settled.
    HealthChecked(Result<(), ApiError>),
    /// The vocabulary fetch settled (empty on failure).
    SuggestionsLoaded(Vec<String>),
    /// An analysis settled.
    AnalysisFinished(Result<AnalysisResult, ApiError>),
    /// The results cue timer fired.
    ResultsCueElapsed,
}

// ──────────────────── commands ────────────────────

/// Side-effects returned by the update function for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCmd {
    /// No side-effect.
    None,
    /// Execute multiple commands; none waits on another.
    Batch(Vec<Self>),
    /// Call the health endpoint and deliver `HealthChecked`.
    CheckHealth,
    /// Fetch the vocabulary and deliver `SuggestionsLoaded`.
    LoadSuggestions,
    /// Analyze the (already trimmed) text and deliver `AnalysisFinished`.
    Analyze(String),
    /// Deliver `ResultsCueElapsed` after the given delay.
    ScheduleResultsCue(Duration),
}

impl SessionCmd {
    /// Flatten nested batches into a list of leaf commands.
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(cmds) => cmds.into_iter().flat_map(Self::flatten).collect(),
            leaf => vec![leaf],
        }
    }
}

// ──────────────────── tests ────────────────────

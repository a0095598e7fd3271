//! Session runtime: owns the model, executes commands, applies results.
//!
//! Remote calls run on short-lived worker threads. Workers never touch the
//! model; they send one [`SessionMsg`] back over a channel and the owning
//! thread applies it through [`update`]. All mutation therefore happens on a
//! single thread at well-defined points.

#![allow(missing_docs)]

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::client::{ApiError, RemedyApi};
use crate::core::config::SessionConfig;

use super::model::{SessionCmd, SessionModel, SessionMsg, UiState};
use super::update::update;

/// Optional presentation hooks. Both default to no-ops.
pub trait SessionObserver {
    /// Called after every applied message.
    fn on_state_changed(&mut self, model: &SessionModel) {
        let _ = model;
    }

    /// Called once per results cue, shortly after a successful analysis.
    fn on_results_ready(&mut self, model: &SessionModel) {
        let _ = model;
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSessionObserver;

impl SessionObserver for NullSessionObserver {}

/// Drives a [`SessionModel`] against a [`RemedyApi`].
pub struct SessionRuntime<A: RemedyApi + 'static> {
    api: Arc<A>,
    model: SessionModel,
    tx: Sender<SessionMsg>,
    rx: Receiver<SessionMsg>,
    /// Worker messages not yet received.
    pending: usize,
    observer: Box<dyn SessionObserver>,
}

impl<A: RemedyApi + 'static> SessionRuntime<A> {
    pub fn new(api: Arc<A>, config: &SessionConfig) -> Self {
        let (tx, rx) = unbounded();
        Self {
            api,
            model: SessionModel::new(config.input_soft_limit, config.results_cue_delay()),
            tx,
            rx,
            pending: 0,
            observer: Box::new(NullSessionObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn model(&self) -> &SessionModel {
        &self.model
    }

    /// Number of worker results still outstanding.
    pub fn pending(&self) -> usize {
        self.pending
    }

    // ──────────────────── user actions ────────────────────

    /// Start the health check and vocabulary fetch. Does not block.
    pub fn initialize(&mut self) {
        self.dispatch(SessionMsg::Init);
    }

    /// Submit text for analysis. Does not block.
    ///
    /// Returns `false` when the submit was rejected (blank text, or an
    /// analysis already in flight).
    pub fn submit(&mut self, text: &str) -> bool {
        let before = self.model.analyses_issued;
        self.dispatch(SessionMsg::Submit(text.to_string()));
        self.model.analyses_issued > before
    }

    /// Submit and block until the analysis settles.
    pub fn submit_and_wait(&mut self, text: &str) -> &UiState {
        if self.submit(text) {
            self.run_until(|m| !m.ui.is_loading());
        }
        &self.model.ui
    }

    /// Clear error/result and re-run the health check. Does not block.
    pub fn retry(&mut self) {
        self.dispatch(SessionMsg::Retry);
    }

    pub fn set_input(&mut self, text: &str) {
        self.dispatch(SessionMsg::InputChanged(text.to_string()));
    }

    pub fn accept_suggestion(&mut self, suggestion: &str) {
        self.dispatch(SessionMsg::AcceptSuggestion(suggestion.to_string()));
    }

    pub fn quick_add(&mut self, symptom: &str) {
        self.dispatch(SessionMsg::QuickAdd(symptom.to_string()));
    }

    pub fn clear_input(&mut self) {
        self.dispatch(SessionMsg::ClearInput);
    }

    /// Autocomplete candidates for the current input.
    pub fn suggestions(&self) -> Vec<String> {
        self.model.suggestions()
    }

    // ──────────────────── message pump ────────────────────

    /// Apply a message and execute the resulting command.
    pub fn dispatch(&mut self, msg: SessionMsg) {
        let cue_due = matches!(msg, SessionMsg::ResultsCueElapsed)
            && self.model.results_cue_pending
            && self.model.ui.result().is_some();

        let cmd = update(&mut self.model, msg);
        self.observer.on_state_changed(&self.model);
        if cue_due {
            self.observer.on_results_ready(&self.model);
        }
        self.execute(cmd);
    }

    /// Apply every worker result that is already available. Never blocks.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while self.pending > 0 {
            let Ok(msg) = self.rx.try_recv() else { break };
            self.pending -= 1;
            self.dispatch(msg);
            applied += 1;
        }
        applied
    }

    /// Block until `done(model)` holds or no work remains outstanding.
    pub fn run_until(&mut self, mut done: impl FnMut(&SessionModel) -> bool) {
        while !done(&self.model) && self.pending > 0 {
            let Ok(msg) = self.rx.recv() else { break };
            self.pending -= 1;
            self.dispatch(msg);
        }
    }

    /// Block until every outstanding worker result has been applied.
    pub fn settle(&mut self) {
        self.run_until(|_| false);
    }

    /// Like [`settle`](Self::settle) but gives up after `limit`.
    ///
    /// Returns `true` when nothing is left outstanding.
    pub fn settle_timeout(&mut self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        while self.pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(msg) => {
                    self.pending -= 1;
                    self.dispatch(msg);
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        self.pending == 0
    }

    // ──────────────────── command execution ────────────────────

    fn execute(&mut self, cmd: SessionCmd) {
        for leaf in cmd.flatten() {
            match leaf {
                SessionCmd::CheckHealth => {
                    let api = Arc::clone(&self.api);
                    self.spawn_worker(
                        "ayur-health",
                        move || SessionMsg::HealthChecked(api.health_check().map(|_| ())),
                        SessionMsg::HealthChecked(Err(ApiError::connectivity(
                            "health worker failed",
                        ))),
                    );
                }
                SessionCmd::LoadSuggestions => {
                    let api = Arc::clone(&self.api);
                    self.spawn_worker(
                        "ayur-suggestions",
                        move || SessionMsg::SuggestionsLoaded(api.fetch_suggestions()),
                        SessionMsg::SuggestionsLoaded(Vec::new()),
                    );
                }
                SessionCmd::Analyze(text) => {
                    let api = Arc::clone(&self.api);
                    self.spawn_worker(
                        "ayur-analyze",
                        move || SessionMsg::AnalysisFinished(api.analyze_symptoms(&text)),
                        SessionMsg::AnalysisFinished(Err(ApiError::generic_analysis())),
                    );
                }
                SessionCmd::ScheduleResultsCue(delay) => {
                    self.spawn_worker(
                        "ayur-results-cue",
                        move || {
                            thread::sleep(delay);
                            SessionMsg::ResultsCueElapsed
                        },
                        SessionMsg::ResultsCueElapsed,
                    );
                }
                SessionCmd::None | SessionCmd::Batch(_) => {}
            }
        }
    }

    /// Run `work` on its own thread and deliver its message.
    ///
    /// If the thread cannot be spawned or `work` panics, `fallback` is
    /// delivered instead so the model always leaves its waiting state.
    fn spawn_worker<F>(&mut self, name: &str, work: F, fallback: SessionMsg)
    where
        F: FnOnce() -> SessionMsg + Send + 'static,
    {
        self.pending += 1;
        let tx = self.tx.clone();
        let worker_fallback = fallback.clone();
        let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
            let msg = panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or(worker_fallback);
            let _ = tx.send(msg);
        });
        if spawned.is_err() {
            let _ = self.tx.send(fallback);
        }
    }
}

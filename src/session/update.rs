//! Pure update function for the Elm-style session controller.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//!
//! **Design invariant:** this module performs zero I/O. All effects are
//! described as [`SessionCmd`] values.

use super::model::{ConnectivityStatus, SessionCmd, SessionModel, SessionMsg, UiState};
use super::suggest;

/// Apply a message to the model and return the next command for the runtime.
///
/// Every state transition goes through this function.
pub fn update(model: &mut SessionModel, msg: SessionMsg) -> SessionCmd {
    match msg {
        SessionMsg::Init => {
            model.connectivity = ConnectivityStatus::Checking;
            model.health_checks_issued += 1;
            SessionCmd::Batch(vec![SessionCmd::CheckHealth, SessionCmd::LoadSuggestions])
        }

        SessionMsg::InputChanged(text) => {
            model.input = text;
            SessionCmd::None
        }

        SessionMsg::AcceptSuggestion(suggestion) => {
            model.input = suggest::accept(&model.input, &suggestion);
            SessionCmd::None
        }

        SessionMsg::QuickAdd(symptom) => {
            model.input = suggest::quick_add(&model.input, &symptom);
            SessionCmd::None
        }

        SessionMsg::ClearInput => {
            model.input.clear();
            SessionCmd::None
        }

        SessionMsg::Submit(text) => {
            let trimmed = text.trim();
            // Rejected submits leave the model untouched.
            if trimmed.is_empty() || model.ui.is_loading() {
                return SessionCmd::None;
            }
            model.ui = UiState::Loading;
            model.results_cue_pending = false;
            model.analyses_issued += 1;
            SessionCmd::Analyze(trimmed.to_string())
        }

        SessionMsg::AnalysisFinished(outcome) => {
            if !model.ui.is_loading() {
                // Nothing in flight; a late delivery must not clobber state.
                return SessionCmd::None;
            }
            match outcome {
                Ok(result) => {
                    model.extracted_symptoms.clone_from(&result.extracted_symptoms);
                    model.ui = UiState::Success(result);
                    model.results_cue_pending = true;
                    SessionCmd::ScheduleResultsCue(model.results_cue_delay)
                }
                Err(err) => {
                    model.ui = UiState::Error(err.to_string());
                    SessionCmd::None
                }
            }
        }

        SessionMsg::Retry => {
            if !model.ui.is_loading() {
                model.ui = UiState::Idle;
            }
            model.results_cue_pending = false;
            model.connectivity = ConnectivityStatus::Checking;
            model.health_checks_issued += 1;
            SessionCmd::CheckHealth
        }

        SessionMsg::HealthChecked(outcome) => {
            model.connectivity = if outcome.is_ok() {
                ConnectivityStatus::Online
            } else {
                ConnectivityStatus::Offline
            };
            SessionCmd::None
        }

        SessionMsg::SuggestionsLoaded(vocabulary) => {
            model.vocabulary = vocabulary;
            model.vocabulary_loaded = true;
            SessionCmd::None
        }

        SessionMsg::ResultsCueElapsed => {
            model.results_cue_pending = false;
            SessionCmd::None
        }
    }
}

//! Session controller: Elm-style model/update plus a thread-backed runtime.
//!
//! Seams: `model` (state, messages, commands), `update` (pure transitions),
//! `runtime` (command execution), `suggest` (autocomplete).

pub mod model;
pub mod runtime;
pub mod suggest;
pub mod update;

#[cfg(test)]
mod test_properties;

pub use model::{ConnectivityStatus, SessionCmd, SessionModel, SessionMsg, UiState};
pub use runtime::{NullSessionObserver, SessionObserver, SessionRuntime};
pub use update::update;

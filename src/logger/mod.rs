//! Request diagnostics: JSONL append-only log and pluggable observers.

pub mod jsonl;
pub mod observer;

pub use observer::{
    JsonlRequestObserver, MemoryRequestObserver, NullRequestObserver, ObservedEvent, ObserverSet,
    RequestObserver,
};

//! Port definitions (trait abstractions) for the hub's collaborators.
//!
//! The hub only talks to consumers through these traits, so a UI, a CLI,
//! or a test can observe it without the hub knowing which one is attached.

mod event_emitter;
mod runtime_log_sink;

pub use event_emitter::{BroadcastEmitter, EmitError, McpEventEmitter, NoopEmitter};
pub use runtime_log_sink::{NoopLogSink, RuntimeLogSink};

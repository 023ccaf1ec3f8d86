//! Runtime log sink port.
//!
//! The protocol client forwards every stderr line (and its own lifecycle
//! notes) through this port; the hub's implementation appends to the
//! per-server ring buffer and publishes a `RuntimeLogsChanged` event.

use crate::domain::RuntimeLogLevel;

/// Port for appending runtime log lines for a server.
///
/// Called from reader tasks, so implementations must be thread-safe and
/// must not block.
pub trait RuntimeLogSink: Send + Sync {
    /// Append a log line (without trailing newline) for `server_id`.
    fn append(&self, server_id: &str, level: RuntimeLogLevel, line: String);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

impl RuntimeLogSink for NoopLogSink {
    fn append(&self, _server_id: &str, _level: RuntimeLogLevel, _line: String) {}
}

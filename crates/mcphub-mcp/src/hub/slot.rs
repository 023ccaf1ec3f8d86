//! Per-server state owned by the hub.
//!
//! The lifecycle version is a fencing token: every start intent and every
//! stop intent bumps it, and a start attempt only commits while the version
//! it captured is still current. Versions are read and bumped while the
//! state lock is held, so a check-then-commit under that lock cannot
//! interleave with an intent. Status events are emitted under the same
//! lock, so listeners see them in the order the state changed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mcphub_core::{McpServerConfig, McpServerStatus, ServerCapabilities};
use tokio_util::sync::CancellationToken;

use crate::connector::McpConnection;

pub(crate) struct ServerSlot {
    pub(crate) id: String,
    version: AtomicU64,
    state: Mutex<SlotState>,
}

pub(crate) struct SlotState {
    pub(crate) config: McpServerConfig,
    pub(crate) status: McpServerStatus,
    pub(crate) error: Option<String>,
    pub(crate) capabilities: Option<ServerCapabilities>,
    /// Live connection, set once the handshake has completed.
    pub(crate) connection: Option<Arc<dyn McpConnection>>,
    /// Cancels the in-flight start attempt.
    pub(crate) attempt: Option<CancellationToken>,
}

impl ServerSlot {
    pub(crate) fn new(config: McpServerConfig) -> Self {
        Self {
            id: config.id.clone(),
            version: AtomicU64::new(0),
            state: Mutex::new(SlotState {
                config,
                status: McpServerStatus::Stopped,
                error: None,
                capabilities: None,
                connection: None,
                attempt: None,
            }),
        }
    }

    /// Never hold the guard across an `.await`.
    pub(crate) fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a new lifecycle intent. Call with the state lock held.
    pub(crate) fn bump_version(&self, _state: &SlotState) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `version` is still current. Call with the state lock held.
    pub(crate) fn is_current(&self, _state: &SlotState, version: u64) -> bool {
        self.version.load(Ordering::SeqCst) == version
    }

    #[cfg(test)]
    pub(crate) fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

impl SlotState {
    /// Reset to `stopped`, returning the connection to stop and whether
    /// the status changed.
    pub(crate) fn reset_stopped(&mut self) -> (Option<Arc<dyn McpConnection>>, bool) {
        if let Some(attempt) = self.attempt.take() {
            attempt.cancel();
        }
        let changed = self.status != McpServerStatus::Stopped;
        self.status = McpServerStatus::Stopped;
        self.error = None;
        self.capabilities = None;
        (self.connection.take(), changed)
    }

    /// Move to `error` with a message, returning the connection to stop.
    pub(crate) fn set_error(&mut self, message: String) -> Option<Arc<dyn McpConnection>> {
        self.attempt = None;
        self.status = McpServerStatus::Error;
        self.error = Some(message);
        self.capabilities = None;
        self.connection.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_invalidates_captured_version() {
        let slot = ServerSlot::new(McpServerConfig::stdio("a", "A", "node", vec![]));
        let state = slot.lock();

        let v1 = slot.bump_version(&state);
        assert!(slot.is_current(&state, v1));

        let v2 = slot.bump_version(&state);
        assert!(!slot.is_current(&state, v1));
        assert!(slot.is_current(&state, v2));
        drop(state);
        assert_eq!(slot.version(), v2);
    }

    #[test]
    fn test_reset_stopped_cancels_attempt() {
        let slot = ServerSlot::new(McpServerConfig::stdio("a", "A", "node", vec![]));
        let token = CancellationToken::new();
        let mut state = slot.lock();
        state.status = McpServerStatus::Starting;
        state.attempt = Some(token.clone());

        let (connection, changed) = state.reset_stopped();
        assert!(connection.is_none());
        assert!(changed);
        assert!(token.is_cancelled());

        let (_, changed) = state.reset_stopped();
        assert!(!changed);
    }
}

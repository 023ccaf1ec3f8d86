//! Event emitter trait for hub event fan-out.
//!
//! This module defines the abstraction for publishing hub events.
//! Implementations handle transport details (channels, UI bridges, etc.).

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::trace;

use crate::events::McpEvent;

/// Default capacity of the broadcast channel behind `BroadcastEmitter`.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Failure to hand an event to its listeners.
///
/// The hub logs these and carries on; they never reach the caller whose
/// operation triggered the event.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("event channel closed")]
    Closed,

    #[error("event listener failed: {0}")]
    Listener(String),
}

/// Trait for publishing hub events.
///
/// This abstraction keeps event plumbing consistent and prevents channel
/// types from becoming part of the hub's public API surface.
///
/// # Implementations
///
/// - `NoopEmitter` - For tests and contexts that don't need events
/// - `BroadcastEmitter` - Bounded multi-subscriber channel
pub trait McpEventEmitter: Send + Sync {
    /// Publish an event.
    ///
    /// Must not block; implementations buffer or drop. The hub calls this
    /// while holding per-server state locks, so implementations must not
    /// call back into the hub.
    fn emit(&self, event: McpEvent) -> Result<(), EmitError>;
}

/// A no-op event emitter.
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    /// Create a new no-op emitter.
    pub const fn new() -> Self {
        Self
    }
}

impl McpEventEmitter for NoopEmitter {
    fn emit(&self, _event: McpEvent) -> Result<(), EmitError> {
        Ok(())
    }
}

/// Emitter backed by a bounded `tokio::sync::broadcast` channel.
///
/// The channel never grows: once a subscriber falls `capacity` events
/// behind, its oldest unread events are dropped and its next `recv`
/// reports `RecvError::Lagged`. Producers are never blocked.
#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    sender: broadcast::Sender<McpEvent>,
}

impl BroadcastEmitter {
    /// Create an emitter with the given per-subscriber backlog.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to hub events.
    pub fn subscribe(&self) -> broadcast::Receiver<McpEvent> {
        self.sender.subscribe()
    }

    /// Get number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl McpEventEmitter for BroadcastEmitter {
    fn emit(&self, event: McpEvent) -> Result<(), EmitError> {
        // Nobody listening is not a failure
        if self.sender.receiver_count() == 0 {
            trace!(event = event.event_name(), "No subscribers, dropping event");
            return Ok(());
        }

        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|_| EmitError::Closed)
    }
}

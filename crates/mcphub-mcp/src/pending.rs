//! In-flight request table.
//!
//! Each entry is removed exactly once: by the dispatcher when the response
//! arrives, by the caller on timeout, or by `fail_all` when the client stops.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::client::McpClientError;

pub type RequestOutcome = Result<Value, McpClientError>;

#[derive(Debug, Default)]
pub struct PendingRequests {
    waiters: Mutex<HashMap<String, oneshot::Sender<RequestOutcome>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<RequestOutcome>>> {
        // The map stays consistent even if a holder panicked
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a waiter for `id`.
    pub fn register(&self, id: String) -> oneshot::Receiver<RequestOutcome> {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(id, tx);
        rx
    }

    /// Deliver an outcome. Returns false when no waiter matches `id`.
    pub fn complete(&self, id: &str, outcome: RequestOutcome) -> bool {
        let waiter = self.lock().remove(id);
        match waiter {
            // Receiver may have timed out between removal and send
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Drop the waiter for `id` without delivering anything.
    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Fail every waiter, leaving the table empty.
    pub fn fail_all(&self, make_error: impl Fn() -> McpClientError) -> usize {
        let drained: Vec<_> = self.lock().drain().collect();
        let count = drained.len();
        for (_, tx) in drained {
            let _ = tx.send(Err(make_error()));
        }
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

//! Command handlers that delegate to the hub.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call hub methods
//!   3. Format output for the terminal
//!
//! Handlers that start servers always shut the hub down before returning.

pub mod call;
pub mod check;
pub mod servers;
pub mod tools;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::bootstrap::CliContext;
use crate::presentation::print_event;

/// Print hub progress to stderr until the returned task is aborted.
pub(crate) fn watch_events(ctx: &CliContext) -> JoinHandle<()> {
    let mut events = ctx.events.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    })
}

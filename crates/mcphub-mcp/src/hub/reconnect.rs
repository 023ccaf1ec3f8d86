//! Auto-reconnect loop.
//!
//! Periodically restarts opted-in servers that sit in `error` or `stopped`.
//! Best-effort: failures are logged and retried on the next tick.

use std::sync::{Arc, PoisonError, Weak};
use std::time::Duration;

use mcphub_core::McpServerStatus;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{HubInner, McpHub};

impl McpHub {
    /// Start the auto-reconnect loop. Replaces a loop that is already running.
    pub fn start_auto_reconnect(&self) {
        let token = CancellationToken::new();
        let previous = self
            .inner
            .reconnect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let period = self.inner.options.reconnect_interval;
        tokio::spawn(reconnect_loop(Arc::downgrade(&self.inner), period, token));
        info!(interval_ms = period.as_millis(), "Started MCP auto-reconnect");
    }

    /// Stop the auto-reconnect loop, if running.
    pub fn stop_auto_reconnect(&self) {
        if let Some(token) = self
            .inner
            .reconnect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
            debug!("Stopped MCP auto-reconnect");
        }
    }

    /// Ids of servers the loop should try to bring back.
    fn reconnect_candidates(&self) -> Vec<String> {
        self.slots()
            .into_iter()
            .filter(|slot| {
                let state = slot.lock();
                state.config.auto_reconnect
                    && state.config.trusted
                    && matches!(
                        state.status,
                        McpServerStatus::Error | McpServerStatus::Stopped
                    )
            })
            .map(|slot| slot.id.clone())
            .collect()
    }

    pub(crate) async fn reconnect_sweep(&self) {
        for server_id in self.reconnect_candidates() {
            debug!(server_id = %server_id, "Auto-reconnecting MCP server");
            if let Err(e) = self.restart_server(&server_id).await {
                warn!(server_id = %server_id, error = %e, "MCP auto-reconnect failed");
            }
        }
    }
}

async fn reconnect_loop(hub: Weak<HubInner>, period: Duration, token: CancellationToken) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                // The hub was dropped; nothing left to heal
                let Some(inner) = hub.upgrade() else { break };
                McpHub { inner }.reconnect_sweep().await;
            }
        }
    }

    debug!("MCP auto-reconnect loop exited");
}

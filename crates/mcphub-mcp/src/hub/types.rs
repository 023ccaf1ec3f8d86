//! Public types of the hub API.

use std::time::Duration;

use mcphub_core::{McpServerConfig, McpServerStatus, McpTool, ServerCapabilities};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::McpClientError;
use crate::logs::{DEFAULT_MAX_LOG_LINES, DEFAULT_MAX_MESSAGE_CHARS};

/// Errors returned by hub operations.
#[derive(Debug, Error)]
pub enum McpHubError {
    #[error("Unknown MCP server: {0}")]
    UnknownServer(String),

    #[error("Invalid configuration for MCP server '{server_id}': {reason}")]
    Configuration { server_id: String, reason: String },

    #[error("MCP server not running: {0}")]
    NotRunning(String),

    #[error("MCP server '{server_id}': {source}")]
    Client {
        server_id: String,
        #[source]
        source: McpClientError,
    },
}

impl McpHubError {
    pub(crate) fn configuration(server_id: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            server_id: server_id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn client(server_id: &str, source: McpClientError) -> Self {
        Self::Client {
            server_id: server_id.to_string(),
            source,
        }
    }
}

/// How a `start_server` call ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The server is running and its tools are registered.
    Started,
    /// The server was already starting or running; nothing was done.
    AlreadyActive,
    /// A stop (or another lifecycle change) overtook this attempt; the
    /// attempt cleaned up after itself and changed no state.
    Superseded,
}

/// Hub tunables.
#[derive(Debug, Clone)]
pub struct HubOptions {
    /// Pause between the stop and start halves of a restart.
    pub restart_delay: Duration,
    /// Period of the auto-reconnect loop.
    pub reconnect_interval: Duration,
    /// Runtime log lines kept per server.
    pub max_log_lines: usize,
    /// Runtime log message cap, in characters.
    pub max_log_message_chars: usize,
}

impl Default for HubOptions {
    fn default() -> Self {
        Self {
            restart_delay: Duration::from_millis(500),
            reconnect_interval: Duration::from_secs(10),
            max_log_lines: DEFAULT_MAX_LOG_LINES,
            max_log_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}

/// Snapshot of one registered server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerInfo {
    pub config: McpServerConfig,
    pub status: McpServerStatus,
    /// Last error, set while `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Negotiated during the handshake; present while running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<ServerCapabilities>,
    /// Tools exposed by this server (populated when running).
    #[serde(default)]
    pub tools: Vec<McpTool>,
}

impl McpServerInfo {
    pub fn id(&self) -> &str {
        &self.config.id
    }
}

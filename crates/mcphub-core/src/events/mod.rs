//! Canonical event union for MCP hub lifecycle events.
//!
//! This module is the single source of truth for events published by the hub
//! and consumed by adapters (UI bridges, CLI progress output, tests).
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "status_changed", "serverId": "fs", "status": "running" }
//! ```
//!
//! Delivery is best-effort and at-least-once from the consumer's point of
//! view: a slow subscriber may miss intermediate events and must re-read
//! state from the hub instead of relying on a complete history.

use serde::{Deserialize, Serialize};

use crate::domain::{McpServerStatus, McpTool};

/// Events published by the MCP hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum McpEvent {
    /// A server configuration was registered (or replaced).
    ServerRegistered {
        #[serde(rename = "serverId")]
        server_id: String,
        #[serde(rename = "serverName")]
        server_name: String,
    },

    /// A server configuration was removed from the hub.
    ServerUnregistered {
        #[serde(rename = "serverId")]
        server_id: String,
    },

    /// A server's runtime status changed.
    StatusChanged {
        #[serde(rename = "serverId")]
        server_id: String,
        status: McpServerStatus,
        /// Last error message, present when `status` is `error`.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Tool discovery completed and the registry entry was replaced.
    ToolsDiscovered {
        #[serde(rename = "serverId")]
        server_id: String,
        tools: Vec<McpTool>,
    },

    /// A server's runtime log buffer was appended to or cleared.
    RuntimeLogsChanged {
        #[serde(rename = "serverId")]
        server_id: String,
    },
}

impl McpEvent {
    /// Get the event name for wire protocols.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::ServerRegistered { .. } => "mcp:registered",
            Self::ServerUnregistered { .. } => "mcp:unregistered",
            Self::StatusChanged { .. } => "mcp:status",
            Self::ToolsDiscovered { .. } => "mcp:tools",
            Self::RuntimeLogsChanged { .. } => "mcp:logs",
        }
    }

    /// The server this event is about.
    pub fn server_id(&self) -> &str {
        match self {
            Self::ServerRegistered { server_id, .. }
            | Self::ServerUnregistered { server_id }
            | Self::StatusChanged { server_id, .. }
            | Self::ToolsDiscovered { server_id, .. }
            | Self::RuntimeLogsChanged { server_id } => server_id,
        }
    }

    /// Create a server registered event.
    pub fn server_registered(server_id: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self::ServerRegistered {
            server_id: server_id.into(),
            server_name: server_name.into(),
        }
    }

    /// Create a server unregistered event.
    pub fn server_unregistered(server_id: impl Into<String>) -> Self {
        Self::ServerUnregistered {
            server_id: server_id.into(),
        }
    }

    /// Create a status changed event.
    pub fn status_changed(
        server_id: impl Into<String>,
        status: McpServerStatus,
        error: Option<String>,
    ) -> Self {
        Self::StatusChanged {
            server_id: server_id.into(),
            status,
            error,
        }
    }

    /// Create a tools discovered event.
    pub fn tools_discovered(server_id: impl Into<String>, tools: Vec<McpTool>) -> Self {
        Self::ToolsDiscovered {
            server_id: server_id.into(),
            tools,
        }
    }

    /// Create a runtime logs changed event.
    pub fn runtime_logs_changed(server_id: impl Into<String>) -> Self {
        Self::RuntimeLogsChanged {
            server_id: server_id.into(),
        }
    }
}

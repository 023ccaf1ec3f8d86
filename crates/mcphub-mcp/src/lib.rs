//! MCP server process orchestration.
//!
//! Launches local MCP servers over stdio, speaks newline-delimited JSON-RPC
//! 2.0 with them, and keeps their tools, status and runtime logs in one
//! place.
//!
//! ## Layers
//!
//! - [`security`]: pre-launch gate (trust flag, metacharacters, allow-list)
//! - [`resolver`]: command name to executable path resolution
//! - [`protocol`]: JSON-RPC message shapes and MCP method names
//! - [`McpClient`]: one server process and its request correlation
//! - [`ToolRegistry`] / [`RuntimeLogStore`]: per-server tool lists and logs
//! - [`McpHub`]: lifecycle state machine, events and auto-reconnect
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mcphub_core::{BroadcastEmitter, McpServerConfig};
//! use mcphub_mcp::{McpHub, StdioConnector};
//!
//! # async fn run() -> Result<(), mcphub_mcp::McpHubError> {
//! let hub = McpHub::new(
//!     Arc::new(StdioConnector::default()),
//!     Arc::new(BroadcastEmitter::default()),
//! );
//!
//! let config = McpServerConfig::stdio(
//!     "fs",
//!     "Filesystem",
//!     "npx",
//!     vec!["-y".into(), "@modelcontextprotocol/server-filesystem".into()],
//! )
//! .with_trusted(true);
//!
//! hub.register_server(config).await?;
//! hub.start_server("fs").await?;
//! for tool in hub.server_tools("fs")? {
//!     println!("{}", tool.name);
//! }
//! hub.shutdown().await;
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub(crate) mod client;
pub(crate) mod connector;
pub(crate) mod hub;
pub(crate) mod logs;
pub(crate) mod path;
pub(crate) mod pending;
pub mod protocol;
pub(crate) mod registry;
pub mod resolver;
pub mod security;
pub(crate) mod shutdown;
pub(crate) mod stream;

// Re-export domain types from core for convenience
pub use mcphub_core::{
    McpServerConfig, McpServerStatus, McpTool, McpToolCallRequest, McpToolResult, McpTransport,
    RuntimeLogEntry, RuntimeLogLevel, ServerCapabilities,
};

// Re-export this crate's public types
pub use client::{ClientOptions, McpClient, McpClientError};
pub use connector::{McpConnection, McpConnector, StdioConnector};
pub use hub::{HubOptions, McpHub, McpHubError, McpServerInfo, StartOutcome};
pub use logs::{DEFAULT_MAX_LOG_LINES, DEFAULT_MAX_MESSAGE_CHARS, LogBuffer, RuntimeLogStore};
pub use registry::ToolRegistry;
pub use security::{SecurityError, SecurityGate};

// Only used by integration tests
#[cfg(test)]
use tokio_test as _;

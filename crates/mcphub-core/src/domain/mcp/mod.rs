//! MCP (Model Context Protocol) server domain types.
//!
//! These types represent MCP servers in the system, independent of any
//! infrastructure concerns (process management, persistence, etc.).
//!
//! # Design
//!
//! - `McpServerConfig` - Immutable launch configuration keyed by a string id
//! - `McpTransport` - Connection type (only stdio is launchable)
//! - `McpServerStatus` - Runtime status (stopped, starting, running, error)
//! - `ServerCapabilities` - What the server negotiated during the handshake
//! - `McpTool` - Tool exposed by an MCP server
//! - `McpToolResult` - Tagged result of a tool invocation
//! - `RuntimeLogEntry` - One line in a server's bounded runtime log

mod logs;
mod types;

pub use logs::{RuntimeLogEntry, RuntimeLogLevel};
pub use types::{
    McpServerConfig, McpServerIdentity, McpServerStatus, McpTool, McpToolCallRequest,
    McpToolResult, McpTransport, ServerCapabilities,
};

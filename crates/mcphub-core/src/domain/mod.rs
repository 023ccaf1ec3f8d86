//! Domain types.

pub mod mcp;

pub use mcp::{
    McpServerConfig, McpServerIdentity, McpServerStatus, McpTool, McpToolCallRequest,
    McpToolResult, McpTransport, RuntimeLogEntry, RuntimeLogLevel, ServerCapabilities,
};

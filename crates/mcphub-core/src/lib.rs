//! Core domain types and ports for mcphub.
//!
//! This crate holds everything the MCP process orchestrator and its adapters
//! share: server configuration and runtime status, tool definitions and tagged
//! tool results, runtime log entries, the lifecycle event union, and the ports
//! (event emitter, runtime log sink) that decouple the hub from its consumers.
//!
//! No process spawning or IO happens here.
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod events;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{CONFIG_DOCUMENT_VERSION, ConfigError, McpConfigDocument};
pub use domain::{
    McpServerConfig, McpServerIdentity, McpServerStatus, McpTool, McpToolCallRequest,
    McpToolResult, McpTransport, RuntimeLogEntry, RuntimeLogLevel, ServerCapabilities,
};
pub use events::McpEvent;
pub use ports::{
    BroadcastEmitter, EmitError, McpEventEmitter, NoopEmitter, NoopLogSink, RuntimeLogSink,
};

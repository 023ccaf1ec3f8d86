//! MCP server domain types.
//!
//! Field names serialize in camelCase to match the persisted config document
//! and the MCP wire format (`inputSchema`, `isError`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type of MCP server connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    /// Stdio-based server - the hub spawns and manages the process
    #[default]
    Stdio,
    /// SSE-based server. Accepted in configuration, never launched.
    Sse,
}

/// Runtime status of an MCP server.
///
/// The last error message lives next to the status (see `McpServerInfo` in
/// the hub crate) so the status itself stays `Copy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpServerStatus {
    /// Server is not running
    #[default]
    Stopped,
    /// Server process is launching or handshaking
    Starting,
    /// Server is running, initialized, and its tools are registered
    Running,
    /// Server failed to start or its process died
    Error,
}

impl McpServerStatus {
    /// Whether a start request should be treated as a no-op.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    /// Stable lowercase name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for McpServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Launch configuration for an MCP server.
///
/// Immutable value: re-registering a config for the same id replaces it
/// wholesale, fields are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerConfig {
    /// Stable identifier used as the key everywhere in the hub.
    pub id: String,

    /// User-friendly name for the server.
    pub name: String,

    /// Command to execute (e.g., "npx" or "/usr/local/bin/node").
    pub command: String,

    /// Arguments passed to the executable, in order.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment overrides layered over the inherited environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Connection type.
    #[serde(default)]
    pub transport: McpTransport,

    /// Start this server as soon as it is registered.
    #[serde(default)]
    pub auto_start: bool,

    /// Whether the user has approved launching this command.
    /// Untrusted servers are never started.
    #[serde(default)]
    pub trusted: bool,

    /// Working directory for the process (must be absolute if set).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    /// Opt in to the hub's background restart loop.
    #[serde(default)]
    pub auto_reconnect: bool,
}

impl McpServerConfig {
    /// Create a stdio server configuration (untrusted, no auto-start).
    pub fn stdio(
        id: impl Into<String>,
        name: impl Into<String>,
        command: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            command: command.into(),
            args,
            env: BTreeMap::new(),
            transport: McpTransport::Stdio,
            auto_start: false,
            trusted: false,
            working_dir: None,
            auto_reconnect: false,
        }
    }

    /// Add an environment override.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Mark the server as trusted (or not).
    #[must_use]
    pub const fn with_trusted(mut self, trusted: bool) -> Self {
        self.trusted = trusted;
        self
    }

    /// Set auto-start.
    #[must_use]
    pub const fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Set auto-reconnect.
    #[must_use]
    pub const fn with_auto_reconnect(mut self, auto_reconnect: bool) -> Self {
        self.auto_reconnect = auto_reconnect;
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the transport.
    #[must_use]
    pub const fn with_transport(mut self, transport: McpTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Structural validation (no filesystem access, no trust decision).
    ///
    /// Returns an error if required fields are missing or malformed.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Server id cannot be empty".to_string());
        }

        if let Some(ref cwd) = self.working_dir {
            if !cwd.is_empty() && !std::path::Path::new(cwd).is_absolute() {
                return Err(format!("Server working_dir must be absolute: {cwd}"));
            }
        }

        Ok(())
    }

    /// Human-readable command line, for logs and error messages.
    pub fn display_command(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Identity a server reports about itself during `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerIdentity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Capabilities negotiated during the handshake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    /// Protocol version the server agreed to.
    pub protocol_version: String,

    /// Server identity, if it sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_info: Option<McpServerIdentity>,

    /// Raw `tools` capability object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,

    /// Raw `resources` capability object (reserved, unused).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,

    /// Raw `prompts` capability object (reserved, unused).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Value>,
}

impl ServerCapabilities {
    /// Whether the server advertised the `tools` capability.
    pub const fn supports_tools(&self) -> bool {
        self.tools.is_some()
    }
}

/// Tool definition from an MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    /// Tool name (function name).
    pub name: String,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for input parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl McpTool {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the input schema.
    #[must_use]
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// A request to invoke a tool on a specific server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolCallRequest {
    pub server_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl McpToolCallRequest {
    pub fn new(
        server_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Result of a tool call that reached the server.
///
/// `Success` means the RPC succeeded; the tool itself may still flag the
/// outcome with `is_error`. `Error` carries the JSON-RPC error object.
/// Transport failures (timeout, disconnect) are not represented here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum McpToolResult {
    Success {
        /// MCP content array (text/image/resource items).
        content: Value,
        #[serde(rename = "isError")]
        is_error: bool,
    },
    Error {
        code: i64,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
}

impl McpToolResult {
    /// Create a success result.
    #[must_use]
    pub const fn success(content: Value) -> Self {
        Self::Success {
            content,
            is_error: false,
        }
    }

    /// Create an RPC error result.
    pub fn error(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Error {
            code,
            message: message.into(),
            data,
        }
    }

    /// True only for an RPC success the tool did not flag as an error.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { is_error: false, .. })
    }

    /// Concatenate the `text` items of a success payload, or the error message.
    pub fn text(&self) -> String {
        match self {
            Self::Success { content, .. } => content
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.get("text").and_then(Value::as_str))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .unwrap_or_default(),
            Self::Error { message, .. } => message.clone(),
        }
    }
}

//! JSON-RPC 2.0 framing for the MCP stdio transport.
//!
//! Messages are single-line UTF-8 JSON objects separated by `\n`.
//! Reference: <https://spec.modelcontextprotocol.io/>

use mcphub_core::{McpServerIdentity, McpTool, ServerCapabilities};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision sent in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Standard JSON-RPC error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Method names used by the client.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const PING: &str = "ping";
}

/// Outgoing request.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: &'a str,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl<'a> JsonRpcRequest<'a> {
    pub const fn new(id: &'a str, method: &'a str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

/// Outgoing notification (no id, no response).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl<'a> JsonRpcNotification<'a> {
    pub const fn new(method: &'a str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

/// Outgoing response to a server-initiated request.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub const fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub const fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Any message read from the server, before classification.
#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// A notification pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerNotification {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Response to one of our requests.
    Response {
        id: String,
        outcome: Result<Value, JsonRpcError>,
    },
    /// Request initiated by the server.
    Request {
        id: Value,
        method: String,
        params: Option<Value>,
    },
    /// Notification (no id).
    Notification(ServerNotification),
}

impl Incoming {
    /// Parse one line of server output.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        let raw: RawMessage = serde_json::from_str(line)?;

        let id = raw.id.filter(|id| !id.is_null());
        Ok(match (id, raw.method) {
            (Some(id), Some(method)) => Self::Request {
                id,
                method,
                params: raw.params,
            },
            (Some(id), None) => Self::Response {
                id: id_to_string(&id),
                outcome: match raw.error {
                    Some(error) => Err(error),
                    None => Ok(raw.result.unwrap_or(Value::Null)),
                },
            },
            (None, Some(method)) => Self::Notification(ServerNotification {
                method,
                params: raw.params,
            }),
            (None, None) => Self::Response {
                // Error replies to unparseable requests carry a null id
                id: String::new(),
                outcome: Err(raw.error.unwrap_or_else(|| {
                    JsonRpcError::new(error_codes::INVALID_REQUEST, "message without id or method")
                })),
            },
        })
    }
}

/// Correlation ids are strings on our side; tolerate servers echoing numbers.
fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `initialize` result payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    #[serde(default)]
    pub server_info: Option<McpServerIdentity>,
    #[serde(default)]
    pub capabilities: CapabilitiesPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapabilitiesPayload {
    #[serde(default)]
    pub tools: Option<Value>,
    #[serde(default)]
    pub resources: Option<Value>,
    #[serde(default)]
    pub prompts: Option<Value>,
}

impl From<InitializeResult> for ServerCapabilities {
    fn from(result: InitializeResult) -> Self {
        Self {
            protocol_version: result.protocol_version,
            server_info: result.server_info,
            tools: result.capabilities.tools,
            resources: result.capabilities.resources,
            prompts: result.capabilities.prompts,
        }
    }
}

/// One page of `tools/list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsListPage {
    #[serde(default)]
    pub tools: Vec<McpTool>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// `tools/call` result payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub is_error: bool,
}

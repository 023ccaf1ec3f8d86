//! Connector ports between the hub and protocol clients.
//!
//! The hub never constructs `McpClient` directly. It asks an `McpConnector`
//! for a started connection, which lets tests substitute in-process fakes
//! and count launches.

use std::sync::Arc;

use async_trait::async_trait;
use mcphub_core::{McpServerConfig, McpTool, McpToolResult, RuntimeLogSink, ServerCapabilities};
use serde_json::{Map, Value};

use crate::client::{ClientOptions, McpClient, McpClientError};

/// A live, initialized session with one server process.
#[async_trait]
pub trait McpConnection: Send + Sync {
    /// Capabilities negotiated during the handshake.
    fn capabilities(&self) -> Option<ServerCapabilities>;

    async fn list_tools(&self) -> Result<Vec<McpTool>, McpClientError>;

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<McpToolResult, McpClientError>;

    /// Stop the session. Idempotent.
    async fn stop(&self);

    /// Resolves when the session ends (output closed or stopped).
    async fn closed(&self);
}

/// Creates and starts connections.
#[async_trait]
pub trait McpConnector: Send + Sync {
    /// Launch `config` and complete the handshake.
    ///
    /// Runtime log lines for the server go to `log_sink`. On error nothing
    /// is left running.
    async fn connect(
        &self,
        config: &McpServerConfig,
        log_sink: Arc<dyn RuntimeLogSink>,
    ) -> Result<Arc<dyn McpConnection>, McpClientError>;
}

#[async_trait]
impl McpConnection for McpClient {
    fn capabilities(&self) -> Option<ServerCapabilities> {
        Self::capabilities(self)
    }

    async fn list_tools(&self) -> Result<Vec<McpTool>, McpClientError> {
        Self::list_tools(self).await
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<McpToolResult, McpClientError> {
        Self::call_tool(self, name, arguments).await
    }

    async fn stop(&self) {
        Self::stop(self).await;
    }

    async fn closed(&self) {
        Self::closed(self).await;
    }
}

/// Production connector: spawns a stdio process per connection.
#[derive(Debug, Clone, Default)]
pub struct StdioConnector {
    options: ClientOptions,
}

impl StdioConnector {
    pub const fn new(options: ClientOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl McpConnector for StdioConnector {
    async fn connect(
        &self,
        config: &McpServerConfig,
        log_sink: Arc<dyn RuntimeLogSink>,
    ) -> Result<Arc<dyn McpConnection>, McpClientError> {
        let client = McpClient::new(config.clone(), self.options.clone(), log_sink);
        client.start().await?;
        Ok(Arc::new(client))
    }
}

//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where the hub is wired together for the
//! CLI adapter: configuration document, stdio connector, security gate and
//! event emitter are instantiated here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mcphub_core::{BroadcastEmitter, McpConfigDocument};
use mcphub_mcp::{ClientOptions, HubOptions, McpHub, SecurityGate, StdioConnector};
use tracing::debug;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Path to the server configuration document.
    pub config_path: PathBuf,
    /// Per-request timeout for MCP calls.
    pub request_timeout: Duration,
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// The loaded configuration document.
    pub document: McpConfigDocument,
    /// Hub with every configured server registered lazily by handlers.
    pub hub: McpHub,
    /// Hub events, for progress output.
    pub events: Arc<BroadcastEmitter>,
    /// Gate used by `check`; the hub holds its own copy.
    pub gate: SecurityGate,
}

/// Load the configuration document and compose the hub.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    let document = McpConfigDocument::load(&config.config_path)?;
    debug!(
        path = %config.config_path.display(),
        servers = document.servers.len(),
        "Loaded MCP configuration"
    );

    let connector = StdioConnector::new(ClientOptions {
        request_timeout: config.request_timeout,
        ..ClientOptions::default()
    });
    let events = Arc::new(BroadcastEmitter::default());
    let gate = SecurityGate::new();
    let hub = McpHub::with_options(
        Arc::new(connector),
        events.clone(),
        gate.clone(),
        HubOptions::default(),
    );

    Ok(CliContext {
        document,
        hub,
        events,
        gate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_loads_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcphub.json");
        std::fs::write(
            &path,
            r#"{"version":1,"servers":[{"id":"fs","name":"Files","command":"npx","args":["-y","server-filesystem"],"trusted":true}]}"#,
        )
        .unwrap();

        let ctx = bootstrap(&CliConfig {
            config_path: path,
            request_timeout: Duration::from_secs(5),
        })
        .unwrap();

        assert_eq!(ctx.document.servers.len(), 1);
        assert!(ctx.hub.list_servers().is_empty());
    }

    #[test]
    fn test_missing_document_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = bootstrap(&CliConfig {
            config_path: dir.path().join("absent.json"),
            request_timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}

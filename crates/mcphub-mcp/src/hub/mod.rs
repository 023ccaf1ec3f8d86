//! MCP server orchestration.
//!
//! `McpHub` owns every registered server, drives start/stop/restart through
//! the security gate and a connector, keeps the tool registry and runtime
//! log buffers in sync, and publishes lifecycle events.
//!
//! Each server lives in its own slot behind the membership map, so work on
//! one server never waits on another server's lock. See `slot` for the
//! lifecycle version fencing that makes concurrent start/stop safe.

mod reconnect;
mod slot;
mod types;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use mcphub_core::{
    McpEvent, McpEventEmitter, McpServerConfig, McpServerStatus, McpTool, McpToolCallRequest,
    McpToolResult, McpTransport, RuntimeLogEntry, RuntimeLogLevel, RuntimeLogSink,
};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::McpClientError;
use crate::connector::{McpConnection, McpConnector};
use crate::logs::RuntimeLogStore;
use crate::registry::ToolRegistry;
use crate::security::SecurityGate;

use slot::ServerSlot;
pub use types::{HubOptions, McpHubError, McpServerInfo, StartOutcome};

type ServerMap = RwLock<HashMap<String, Arc<ServerSlot>>>;

/// Routes client log lines into the ring buffers and announces them.
///
/// Lines for ids that are not registered are dropped, so a process torn
/// down by `unregister_server` cannot recreate its buffer.
struct HubLogSink {
    servers: Arc<ServerMap>,
    logs: Arc<RuntimeLogStore>,
    emitter: Arc<dyn McpEventEmitter>,
}

impl RuntimeLogSink for HubLogSink {
    fn append(&self, server_id: &str, level: RuntimeLogLevel, line: String) {
        {
            // Held across the append so unregistering waits for it
            let servers = self.servers.read().unwrap_or_else(PoisonError::into_inner);
            if !servers.contains_key(server_id) {
                debug!(server_id = %server_id, "Dropped log line for unregistered MCP server");
                return;
            }
            self.logs.append(server_id, level, &line);
        }
        emit_event(
            self.emitter.as_ref(),
            McpEvent::runtime_logs_changed(server_id),
        );
    }
}

fn emit_event(emitter: &dyn McpEventEmitter, event: McpEvent) {
    if let Err(e) = emitter.emit(event) {
        warn!(error = %e, "Failed to emit MCP hub event");
    }
}

struct HubInner {
    servers: Arc<ServerMap>,
    registry: ToolRegistry,
    logs: Arc<RuntimeLogStore>,
    log_sink: Arc<dyn RuntimeLogSink>,
    connector: Arc<dyn McpConnector>,
    gate: SecurityGate,
    emitter: Arc<dyn McpEventEmitter>,
    options: HubOptions,
    reconnect: Mutex<Option<CancellationToken>>,
}

/// Process orchestrator for MCP servers.
///
/// Cheap to clone; clones share the same servers.
#[derive(Clone)]
pub struct McpHub {
    inner: Arc<HubInner>,
}

impl McpHub {
    /// Create a hub with the default security gate and options.
    pub fn new(connector: Arc<dyn McpConnector>, emitter: Arc<dyn McpEventEmitter>) -> Self {
        Self::with_options(
            connector,
            emitter,
            SecurityGate::new(),
            HubOptions::default(),
        )
    }

    /// Create a hub with injected dependencies.
    pub fn with_options(
        connector: Arc<dyn McpConnector>,
        emitter: Arc<dyn McpEventEmitter>,
        gate: SecurityGate,
        options: HubOptions,
    ) -> Self {
        let logs = Arc::new(RuntimeLogStore::new(
            options.max_log_lines,
            options.max_log_message_chars,
        ));
        let servers = Arc::new(RwLock::new(HashMap::new()));
        let log_sink: Arc<dyn RuntimeLogSink> = Arc::new(HubLogSink {
            servers: Arc::clone(&servers),
            logs: Arc::clone(&logs),
            emitter: Arc::clone(&emitter),
        });

        Self {
            inner: Arc::new(HubInner {
                servers,
                registry: ToolRegistry::new(),
                logs,
                log_sink,
                connector,
                gate,
                emitter,
                options,
                reconnect: Mutex::new(None),
            }),
        }
    }

    fn emit(&self, event: McpEvent) {
        emit_event(self.inner.emitter.as_ref(), event);
    }

    fn slot(&self, server_id: &str) -> Result<Arc<ServerSlot>, McpHubError> {
        self.inner
            .servers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(server_id)
            .cloned()
            .ok_or_else(|| McpHubError::UnknownServer(server_id.to_string()))
    }

    fn slots(&self) -> Vec<Arc<ServerSlot>> {
        let mut slots: Vec<_> = self
            .inner
            .servers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        slots.sort_by(|a, b| a.id.cmp(&b.id));
        slots
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a server configuration, replacing any existing one.
    ///
    /// A live server with the same id is stopped first; the new config is
    /// never merged with the old one. When `auto_start && trusted`, a start
    /// is attempted and failures are logged rather than returned.
    pub async fn register_server(&self, config: McpServerConfig) -> Result<(), McpHubError> {
        let server_id = config.id.clone();
        if self.register_inner(config).await? {
            self.auto_start(&server_id).await;
        }
        Ok(())
    }

    /// Register many configurations, then auto-start the eligible ones
    /// concurrently.
    ///
    /// Returns the registrations that were rejected.
    pub async fn register_all(
        &self,
        configs: impl IntoIterator<Item = McpServerConfig>,
    ) -> Vec<McpHubError> {
        let mut rejected = Vec::new();
        let mut to_start = Vec::new();

        for config in configs {
            let server_id = config.id.clone();
            match self.register_inner(config).await {
                Ok(true) => to_start.push(server_id),
                Ok(false) => {}
                Err(e) => {
                    warn!(server_id = %server_id, error = %e, "Rejected MCP server configuration");
                    rejected.push(e);
                }
            }
        }

        let mut starts = JoinSet::new();
        for server_id in to_start {
            let hub = self.clone();
            starts.spawn(async move { hub.auto_start(&server_id).await });
        }
        while starts.join_next().await.is_some() {}

        rejected
    }

    /// Returns whether the server should be auto-started.
    async fn register_inner(&self, config: McpServerConfig) -> Result<bool, McpHubError> {
        config
            .validate()
            .map_err(|reason| McpHubError::configuration(&config.id, reason))?;

        let server_id = config.id.clone();
        let server_name = config.name.clone();
        let auto_start = config.auto_start && config.trusted;

        let (slot, inserted) = {
            let mut servers = self
                .inner
                .servers
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            match servers.get(&server_id) {
                Some(slot) => (Arc::clone(slot), false),
                None => {
                    let slot = Arc::new(ServerSlot::new(config.clone()));
                    servers.insert(server_id.clone(), Arc::clone(&slot));
                    (slot, true)
                }
            }
        };

        if !inserted {
            // Full replace: stop whatever runs under the old config first
            self.stop_slot(&slot).await;
            slot.lock().config = config;
            debug!(server_id = %server_id, "Replaced MCP server configuration");
        }

        info!(server_id = %server_id, server_name = %server_name, "Registered MCP server");
        self.emit(McpEvent::server_registered(&server_id, server_name));

        Ok(auto_start)
    }

    async fn auto_start(&self, server_id: &str) {
        if let Err(e) = self.start_server(server_id).await {
            warn!(server_id = %server_id, error = %e, "Failed to auto-start MCP server");
        }
    }

    /// Stop and forget a server.
    pub async fn unregister_server(&self, server_id: &str) -> Result<(), McpHubError> {
        let slot = self
            .inner
            .servers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(server_id)
            .ok_or_else(|| McpHubError::UnknownServer(server_id.to_string()))?;

        // The slot is out of the map, so no new start can find it; the
        // version bump fences any attempt already in flight
        self.stop_slot(&slot).await;
        self.inner.logs.remove(server_id);

        info!(server_id = %server_id, "Unregistered MCP server");
        self.emit(McpEvent::server_unregistered(server_id));
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start a server.
    ///
    /// Starting a server that is already starting or running is a no-op.
    /// Security and transport checks run before any state change. If a stop
    /// overtakes this attempt, the attempt stops its own connection and
    /// returns `StartOutcome::Superseded`.
    pub async fn start_server(&self, server_id: &str) -> Result<StartOutcome, McpHubError> {
        let slot = self.slot(server_id)?;

        let (config, version, attempt) = {
            let mut state = slot.lock();

            if state.status.is_active() {
                debug!(server_id = %server_id, status = %state.status, "MCP server already active");
                return Ok(StartOutcome::AlreadyActive);
            }

            if state.config.transport != McpTransport::Stdio {
                return Err(McpHubError::configuration(
                    server_id,
                    "only the stdio transport can be started",
                ));
            }

            self.inner
                .gate
                .validate(&state.config)
                .map_err(|e| McpHubError::configuration(server_id, e.to_string()))?;

            let version = slot.bump_version(&state);
            let attempt = CancellationToken::new();
            state.status = McpServerStatus::Starting;
            state.error = None;
            state.capabilities = None;
            state.attempt = Some(attempt.clone());
            self.emit(McpEvent::status_changed(
                server_id,
                McpServerStatus::Starting,
                None,
            ));
            (state.config.clone(), version, attempt)
        };

        info!(server_id = %server_id, command = %config.display_command(), "Starting MCP server");

        // Dropping the connect future on cancel kills the half-started process
        let connected = tokio::select! {
            () = attempt.cancelled() => {
                debug!(server_id = %server_id, "MCP server start cancelled during launch");
                return Ok(StartOutcome::Superseded);
            }
            result = self
                .inner
                .connector
                .connect(&config, Arc::clone(&self.inner.log_sink)) => result,
        };

        let connection = match connected {
            Ok(connection) => connection,
            Err(e) => return self.fail_start(&slot, version, e, None).await,
        };

        // Publish the connection so a concurrent stop can reach it
        let published = {
            let mut state = slot.lock();
            let current = slot.is_current(&state, version);
            if current {
                state.connection = Some(Arc::clone(&connection));
            }
            current
        };
        if !published {
            return Ok(self.abandon_start(server_id, &connection).await);
        }

        let listed = tokio::select! {
            () = attempt.cancelled() => Err(McpClientError::ServerStopped),
            result = connection.list_tools() => result,
        };

        let tools = match listed {
            Ok(tools) => tools,
            Err(e) => return self.fail_start(&slot, version, e, Some(connection)).await,
        };

        let tool_count = tools.len();
        let committed = {
            let mut state = slot.lock();
            let current = slot.is_current(&state, version);
            if current {
                // Registry, status and their events change together under
                // the slot lock
                self.inner.registry.replace(server_id, tools.clone());
                state.capabilities = connection.capabilities();
                state.status = McpServerStatus::Running;
                state.attempt = None;
                self.emit(McpEvent::tools_discovered(server_id, tools));
                self.emit(McpEvent::status_changed(
                    server_id,
                    McpServerStatus::Running,
                    None,
                ));
            }
            current
        };
        if !committed {
            return Ok(self.abandon_start(server_id, &connection).await);
        }

        info!(server_id = %server_id, tool_count, "MCP server started");

        self.spawn_watcher(slot, version, connection);
        Ok(StartOutcome::Started)
    }

    /// Stop the connection of an attempt that lost to a newer intent.
    async fn abandon_start(
        &self,
        server_id: &str,
        connection: &Arc<dyn McpConnection>,
    ) -> StartOutcome {
        debug!(server_id = %server_id, "MCP server start superseded");
        connection.stop().await;
        StartOutcome::Superseded
    }

    async fn fail_start(
        &self,
        slot: &Arc<ServerSlot>,
        version: u64,
        error: McpClientError,
        connection: Option<Arc<dyn McpConnection>>,
    ) -> Result<StartOutcome, McpHubError> {
        if let Some(connection) = &connection {
            connection.stop().await;
        }

        let message = error.to_string();
        {
            let mut state = slot.lock();
            if !slot.is_current(&state, version) {
                return Ok(StartOutcome::Superseded);
            }
            // Already stopped above, or never published
            let _ = state.set_error(message.clone());
            self.inner.registry.remove(&slot.id);
            self.emit(McpEvent::status_changed(
                &slot.id,
                McpServerStatus::Error,
                Some(message),
            ));
        }

        warn!(server_id = %slot.id, error = %error, "Failed to start MCP server");

        Err(McpHubError::client(&slot.id, error))
    }

    /// Watch a running connection and flag the server when it dies.
    fn spawn_watcher(
        &self,
        slot: Arc<ServerSlot>,
        version: u64,
        connection: Arc<dyn McpConnection>,
    ) {
        let hub = self.clone();
        tokio::spawn(async move {
            connection.closed().await;

            let message = "Server process exited unexpectedly".to_string();
            let died = {
                let mut state = slot.lock();
                if slot.is_current(&state, version) && state.status == McpServerStatus::Running
                {
                    let _ = state.set_error(message.clone());
                    hub.inner.registry.remove(&slot.id);
                    hub.emit(McpEvent::status_changed(
                        &slot.id,
                        McpServerStatus::Error,
                        Some(message),
                    ));
                    true
                } else {
                    false
                }
            };

            if died {
                warn!(server_id = %slot.id, "MCP server output closed while running");
                // Reap the process
                connection.stop().await;
            }
        });
    }

    /// Stop a server. Idempotent.
    pub async fn stop_server(&self, server_id: &str) -> Result<(), McpHubError> {
        let slot = self.slot(server_id)?;
        self.stop_slot(&slot).await;
        Ok(())
    }

    async fn stop_slot(&self, slot: &Arc<ServerSlot>) {
        let (connection, changed) = {
            let mut state = slot.lock();
            slot.bump_version(&state);
            self.inner.registry.remove(&slot.id);
            let (connection, changed) = state.reset_stopped();
            if changed {
                self.emit(McpEvent::status_changed(
                    &slot.id,
                    McpServerStatus::Stopped,
                    None,
                ));
            }
            (connection, changed)
        };

        if let Some(connection) = connection {
            connection.stop().await;
        }

        if changed {
            info!(server_id = %slot.id, "MCP server stopped");
        }
    }

    /// Stop, pause for `restart_delay`, start.
    pub async fn restart_server(&self, server_id: &str) -> Result<StartOutcome, McpHubError> {
        self.stop_server(server_id).await?;
        tokio::time::sleep(self.inner.options.restart_delay).await;
        self.start_server(server_id).await
    }

    /// Stop every server and the auto-reconnect loop.
    pub async fn shutdown(&self) {
        self.stop_auto_reconnect();

        let mut stops = JoinSet::new();
        for slot in self.slots() {
            let hub = self.clone();
            stops.spawn(async move { hub.stop_slot(&slot).await });
        }
        while stops.join_next().await.is_some() {}

        info!("MCP hub shut down");
    }

    // =========================================================================
    // Tool calls
    // =========================================================================

    /// Invoke a tool on a running server.
    pub async fn call_tool(
        &self,
        request: McpToolCallRequest,
    ) -> Result<McpToolResult, McpHubError> {
        let slot = self.slot(&request.server_id)?;

        let connection = {
            let state = slot.lock();
            if state.status == McpServerStatus::Running {
                state.connection.clone()
            } else {
                None
            }
        }
        .ok_or_else(|| McpHubError::NotRunning(request.server_id.clone()))?;

        debug!(
            server_id = %request.server_id,
            tool = %request.tool_name,
            "Calling MCP tool"
        );

        connection
            .call_tool(&request.tool_name, request.arguments)
            .await
            .map_err(|e| McpHubError::client(&request.server_id, e))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn info_for(&self, slot: &ServerSlot) -> McpServerInfo {
        let (config, status, error, capabilities) = {
            let state = slot.lock();
            (
                state.config.clone(),
                state.status,
                state.error.clone(),
                state.capabilities.clone(),
            )
        };
        McpServerInfo {
            config,
            status,
            error,
            capabilities,
            tools: self.inner.registry.tools(&slot.id),
        }
    }

    pub fn server_info(&self, server_id: &str) -> Result<McpServerInfo, McpHubError> {
        let slot = self.slot(server_id)?;
        Ok(self.info_for(&slot))
    }

    /// All registered servers, sorted by id.
    pub fn list_servers(&self) -> Vec<McpServerInfo> {
        self.slots()
            .iter()
            .map(|slot| self.info_for(slot))
            .collect()
    }

    pub fn server_status(&self, server_id: &str) -> Result<McpServerStatus, McpHubError> {
        Ok(self.slot(server_id)?.lock().status)
    }

    pub fn server_tools(&self, server_id: &str) -> Result<Vec<McpTool>, McpHubError> {
        self.slot(server_id)?;
        Ok(self.inner.registry.tools(server_id))
    }

    /// Tools of every running server, grouped by server id.
    pub fn all_tools(&self) -> Vec<(String, Vec<McpTool>)> {
        self.inner.registry.all()
    }

    pub fn server_runtime_logs(
        &self,
        server_id: &str,
    ) -> Result<Vec<RuntimeLogEntry>, McpHubError> {
        self.slot(server_id)?;
        Ok(self.inner.logs.entries(server_id))
    }

    pub fn clear_server_runtime_logs(&self, server_id: &str) -> Result<(), McpHubError> {
        self.slot(server_id)?;
        self.inner.logs.clear(server_id);
        self.emit(McpEvent::runtime_logs_changed(server_id));
        Ok(())
    }

    /// Opt a server in or out of the auto-reconnect loop.
    pub fn set_auto_reconnect(&self, server_id: &str, enabled: bool) -> Result<(), McpHubError> {
        self.slot(server_id)?.lock().config.auto_reconnect = enabled;
        debug!(server_id = %server_id, enabled, "Updated MCP auto-reconnect");
        Ok(())
    }
}

impl std::fmt::Debug for McpHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpHub")
            .field("servers", &self.slots().len())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use mcphub_core::{BroadcastEmitter, NoopEmitter, ServerCapabilities};
    use serde_json::{Map, Value};

    use super::*;

    struct StaticConnection {
        closed: CancellationToken,
    }

    #[async_trait]
    impl McpConnection for StaticConnection {
        fn capabilities(&self) -> Option<ServerCapabilities> {
            None
        }

        async fn list_tools(&self) -> Result<Vec<McpTool>, McpClientError> {
            Ok(vec![McpTool::new("echo")])
        }

        async fn call_tool(
            &self,
            _name: &str,
            _arguments: Map<String, Value>,
        ) -> Result<McpToolResult, McpClientError> {
            Ok(McpToolResult::success(Value::Array(vec![])))
        }

        async fn stop(&self) {
            self.closed.cancel();
        }

        async fn closed(&self) {
            self.closed.cancelled().await;
        }
    }

    #[derive(Default)]
    struct CountingConnector {
        launches: AtomicUsize,
    }

    #[async_trait]
    impl McpConnector for CountingConnector {
        async fn connect(
            &self,
            _config: &McpServerConfig,
            _log_sink: Arc<dyn RuntimeLogSink>,
        ) -> Result<Arc<dyn McpConnection>, McpClientError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StaticConnection {
                closed: CancellationToken::new(),
            }))
        }
    }

    fn node_server(id: &str) -> McpServerConfig {
        McpServerConfig::stdio(id, id.to_uppercase(), "node", vec!["server.js".into()])
            .with_trusted(true)
    }

    #[tokio::test]
    async fn test_log_sink_appends_and_emits() {
        let emitter = Arc::new(BroadcastEmitter::new(8));
        let hub = McpHub::new(Arc::new(CountingConnector::default()), emitter.clone());
        hub.register_server(node_server("fs")).await.unwrap();
        let mut events = emitter.subscribe();

        hub.inner
            .log_sink
            .append("fs", RuntimeLogLevel::Warn, "disk almost full".to_string());

        let entries = hub.inner.logs.entries("fs");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, RuntimeLogLevel::Warn);
        assert_eq!(
            events.try_recv().unwrap(),
            McpEvent::runtime_logs_changed("fs")
        );
    }

    #[tokio::test]
    async fn test_log_sink_ignores_unregistered_servers() {
        let hub = McpHub::new(
            Arc::new(CountingConnector::default()),
            Arc::new(NoopEmitter::new()),
        );
        hub.register_server(node_server("fs")).await.unwrap();
        hub.inner
            .log_sink
            .append("fs", RuntimeLogLevel::Info, "booting".to_string());
        hub.unregister_server("fs").await.unwrap();

        // A late line from the torn-down process
        hub.inner
            .log_sink
            .append("fs", RuntimeLogLevel::Error, "broken pipe".to_string());
        hub.inner
            .log_sink
            .append("ghost", RuntimeLogLevel::Info, "hello".to_string());

        assert!(hub.inner.logs.entries("fs").is_empty());
        assert!(hub.inner.logs.entries("ghost").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_server_errors() {
        let hub = McpHub::new(
            Arc::new(CountingConnector::default()),
            Arc::new(NoopEmitter::new()),
        );

        assert!(matches!(
            hub.start_server("ghost").await,
            Err(McpHubError::UnknownServer(id)) if id == "ghost"
        ));
        assert!(matches!(
            hub.set_auto_reconnect("ghost", true),
            Err(McpHubError::UnknownServer(_))
        ));
        assert!(hub.server_runtime_logs("ghost").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_sweep_only_restarts_opted_in_servers() {
        let connector = Arc::new(CountingConnector::default());
        let hub = McpHub::new(connector.clone(), Arc::new(NoopEmitter::new()));
        hub.register_server(node_server("healing").with_auto_reconnect(true))
            .await
            .unwrap();
        hub.register_server(node_server("manual")).await.unwrap();
        hub.register_server(
            node_server("untrusted")
                .with_trusted(false)
                .with_auto_reconnect(true),
        )
        .await
        .unwrap();

        hub.reconnect_sweep().await;

        assert_eq!(
            hub.server_status("healing").unwrap(),
            McpServerStatus::Running
        );
        assert_eq!(
            hub.server_status("manual").unwrap(),
            McpServerStatus::Stopped
        );
        assert_eq!(
            hub.server_status("untrusted").unwrap(),
            McpServerStatus::Stopped
        );
        assert_eq!(connector.launches.load(Ordering::SeqCst), 1);

        // Running servers are left alone
        hub.reconnect_sweep().await;
        assert_eq!(connector.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_reconnect_loop_heals_after_crash() {
        let connector = Arc::new(CountingConnector::default());
        let hub = McpHub::with_options(
            connector.clone(),
            Arc::new(NoopEmitter::new()),
            SecurityGate::new(),
            HubOptions {
                reconnect_interval: Duration::from_secs(1),
                restart_delay: Duration::from_millis(10),
                ..HubOptions::default()
            },
        );
        hub.register_server(node_server("fs").with_auto_reconnect(true))
            .await
            .unwrap();
        hub.start_server("fs").await.unwrap();

        // Simulate the process dying
        let connection = hub.slot("fs").unwrap().lock().connection.clone().unwrap();
        connection.stop().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(hub.server_status("fs").unwrap(), McpServerStatus::Error);
        assert!(hub.server_tools("fs").unwrap().is_empty());

        hub.start_auto_reconnect();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(hub.server_status("fs").unwrap(), McpServerStatus::Running);
        assert_eq!(connector.launches.load(Ordering::SeqCst), 2);

        hub.stop_auto_reconnect();
        hub.stop_auto_reconnect();
        hub.shutdown().await;
        assert_eq!(hub.server_status("fs").unwrap(), McpServerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_clear_runtime_logs_emits() {
        let emitter = Arc::new(BroadcastEmitter::new(16));
        let hub = McpHub::new(Arc::new(CountingConnector::default()), emitter.clone());
        hub.register_server(node_server("fs")).await.unwrap();
        hub.inner
            .log_sink
            .append("fs", RuntimeLogLevel::Info, "ready".to_string());

        let mut events = emitter.subscribe();
        hub.clear_server_runtime_logs("fs").unwrap();

        assert!(hub.server_runtime_logs("fs").unwrap().is_empty());
        assert_eq!(
            events.try_recv().unwrap(),
            McpEvent::runtime_logs_changed("fs")
        );
    }
}

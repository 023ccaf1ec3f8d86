//! Shared test doubles for mcphub-mcp integration tests.

// Each test binary uses a different subset
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mcphub_core::{
    McpEvent, McpServerConfig, McpTool, McpToolResult, RuntimeLogLevel, RuntimeLogSink,
    ServerCapabilities,
};
use mcphub_mcp::{McpClientError, McpConnection, McpConnector};
use serde_json::{Map, Value, json};
use tokio::sync::{Notify, broadcast};
use tokio_util::sync::CancellationToken;

/// Absolute path of the scriptable stdio server built with this package.
#[cfg(feature = "test-server")]
pub const FAKE_SERVER: &str = env!("CARGO_BIN_EXE_fake_mcp_server");

/// Trusted config launching the fake server in `mode`.
#[cfg(feature = "test-server")]
pub fn fake_server_config(id: &str, mode: &str) -> McpServerConfig {
    McpServerConfig::stdio(id, format!("Fake {id}"), FAKE_SERVER, vec![mode.to_string()])
        .with_trusted(true)
}

/// Trusted config for in-process connectors (never launched).
pub fn node_config(id: &str) -> McpServerConfig {
    McpServerConfig::stdio(id, id.to_uppercase(), "node", vec!["server.js".into()])
        .with_trusted(true)
}

pub fn arguments(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Log sink that keeps every line.
#[derive(Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<(String, RuntimeLogLevel, String)>>,
}

impl CollectingSink {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|(_, _, line)| line.contains(needle))
    }
}

impl RuntimeLogSink for CollectingSink {
    fn append(&self, server_id: &str, level: RuntimeLogLevel, line: String) {
        self.lines
            .lock()
            .unwrap()
            .push((server_id.to_string(), level, line));
    }
}

/// Poll `check` until it holds or `within` elapses.
pub async fn eventually(within: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Drain every event currently buffered.
pub fn drain(events: &mut broadcast::Receiver<McpEvent>) -> Vec<McpEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

// ── In-process connector ──────────────────────────────────────────

/// In-process connection with scriptable discovery.
pub struct FakeConnection {
    tools: Vec<McpTool>,
    stopped: AtomicBool,
    closed: CancellationToken,
    list_gate: Option<Arc<Notify>>,
}

impl FakeConnection {
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Simulate the process dying.
    pub fn crash(&self) {
        self.closed.cancel();
    }
}

#[async_trait]
impl McpConnection for FakeConnection {
    fn capabilities(&self) -> Option<ServerCapabilities> {
        Some(ServerCapabilities {
            protocol_version: "2024-11-05".to_string(),
            server_info: None,
            tools: Some(json!({})),
            resources: None,
            prompts: None,
        })
    }

    async fn list_tools(&self) -> Result<Vec<McpTool>, McpClientError> {
        if let Some(gate) = &self.list_gate {
            gate.notified().await;
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<McpToolResult, McpClientError> {
        if self.is_stopped() {
            return Err(McpClientError::ServerStopped);
        }
        Ok(McpToolResult::success(json!([{
            "type": "text",
            "text": format!("{name}:{}", Value::Object(arguments)),
        }])))
    }

    async fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.closed.cancel();
    }

    async fn closed(&self) {
        self.closed.cancelled().await;
    }
}

/// Counting connector with optional gates and failures.
pub struct FakeConnector {
    launches: AtomicUsize,
    tools: Vec<McpTool>,
    fail_with: Mutex<Option<String>>,
    connect_gate: Option<Arc<Notify>>,
    list_gate: Option<Arc<Notify>>,
    log_lines: usize,
    connections: Mutex<Vec<Arc<FakeConnection>>>,
}

impl Default for FakeConnector {
    fn default() -> Self {
        Self {
            launches: AtomicUsize::new(0),
            tools: vec![McpTool::new("read_file"), McpTool::new("write_file")],
            fail_with: Mutex::new(None),
            connect_gate: None,
            list_gate: None,
            log_lines: 0,
            connections: Mutex::new(Vec::new()),
        }
    }
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block `connect` until the gate is notified.
    pub fn with_connect_gate(mut self, gate: Arc<Notify>) -> Self {
        self.connect_gate = Some(gate);
        self
    }

    /// Block discovery until the gate is notified.
    pub fn with_list_gate(mut self, gate: Arc<Notify>) -> Self {
        self.list_gate = Some(gate);
        self
    }

    /// Write `count` runtime log lines on every connect.
    pub fn with_log_lines(mut self, count: usize) -> Self {
        self.log_lines = count;
        self
    }

    pub fn fail_next(&self, reason: &str) {
        *self.fail_with.lock().unwrap() = Some(reason.to_string());
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn connections(&self) -> Vec<Arc<FakeConnection>> {
        self.connections.lock().unwrap().clone()
    }

    pub fn last_connection(&self) -> Arc<FakeConnection> {
        self.connections().pop().expect("no connection made")
    }
}

#[async_trait]
impl McpConnector for FakeConnector {
    async fn connect(
        &self,
        config: &McpServerConfig,
        log_sink: Arc<dyn RuntimeLogSink>,
    ) -> Result<Arc<dyn McpConnection>, McpClientError> {
        self.launches.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.connect_gate {
            gate.notified().await;
        }

        for i in 0..self.log_lines {
            log_sink.append(&config.id, RuntimeLogLevel::Info, format!("line {i}"));
        }

        if let Some(reason) = self.fail_with.lock().unwrap().take() {
            return Err(McpClientError::Launch {
                command: config.display_command(),
                reason,
            });
        }

        let connection = Arc::new(FakeConnection {
            tools: self.tools.clone(),
            stopped: AtomicBool::new(false),
            closed: CancellationToken::new(),
            list_gate: self.list_gate.clone(),
        });
        self.connections.lock().unwrap().push(Arc::clone(&connection));
        Ok(connection)
    }
}

//! MCP JSON-RPC client for one server process.
//!
//! Implements the MCP protocol over stdio (JSON-RPC 2.0). One client owns
//! one process for one start attempt and is never restarted; the hub builds
//! a fresh client for every start.
//!
//! Requests are correlated by UUID and may complete in any order. A stdout
//! reader task dispatches responses to their waiters, a stderr reader keeps
//! a bounded tail for error messages and forwards every line to the
//! runtime log sink.

use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use mcphub_core::{
    McpServerConfig, McpTool, McpToolResult, McpTransport, RuntimeLogLevel, RuntimeLogSink,
    ServerCapabilities,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::path::{build_effective_path, validate_working_dir};
use crate::pending::PendingRequests;
use crate::protocol::{
    CallToolResult, Incoming, InitializeResult, JsonRpcError, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, ServerNotification, ToolsListPage,
    error_codes, methods,
};
use crate::resolver::{ResolveError, resolve_executable};
use crate::shutdown::shutdown_child;
use crate::stream::next_line;

/// Upper bound on `tools/list` pages followed for one listing.
const MAX_TOOL_PAGES: usize = 64;

/// How long a failed handshake waits for the stderr reader to drain.
const STDERR_DRAIN_WAIT: Duration = Duration::from_millis(200);

/// Errors that can occur during MCP client operations.
#[derive(Debug, Error)]
pub enum McpClientError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to launch '{command}': {reason}")]
    Launch { command: String, reason: String },

    #[error("MCP protocol error: {message}{}", tail_suffix(.stderr_tail))]
    Protocol {
        message: String,
        stderr_tail: Option<String>,
    },

    #[error("MCP server returned error: code={code}, message={message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("Timeout after {timeout:?} waiting for '{method}'{}", tail_suffix(.stderr_tail))]
    Timeout {
        method: String,
        timeout: Duration,
        stderr_tail: Option<String>,
    },

    #[error("Server closed its output stream")]
    StreamClosed,

    #[error("Client is not initialized")]
    NotInitialized,

    #[error("Server stopped")]
    ServerStopped,

    #[error("Client was already started")]
    AlreadyStarted,

    #[error("Failed to communicate with MCP server: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[allow(clippy::ref_option)]
fn tail_suffix(tail: &Option<String>) -> String {
    tail.as_ref()
        .map(|t| format!("\nServer stderr:\n{t}"))
        .unwrap_or_default()
}

impl McpClientError {
    fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            stderr_tail: None,
        }
    }
}

impl From<JsonRpcError> for McpClientError {
    fn from(err: JsonRpcError) -> Self {
        Self::Rpc {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

/// Client tunables.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request response deadline.
    pub request_timeout: Duration,
    /// Stderr lines kept for error enrichment.
    pub stderr_tail_lines: usize,
    /// Stderr characters kept for error enrichment.
    pub stderr_tail_chars: usize,
    /// Wait after the graceful terminate before force-killing.
    pub graceful_stop_timeout: Duration,
    /// Wait for reaping after the force kill.
    pub kill_timeout: Duration,
    /// Backlog of the server notification stream.
    pub notification_capacity: usize,
    /// Identity sent in `initialize`.
    pub client_name: String,
    pub client_version: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            stderr_tail_lines: 50,
            stderr_tail_chars: 8192,
            graceful_stop_timeout: Duration::from_millis(1500),
            kill_timeout: Duration::from_millis(500),
            notification_capacity: 64,
            client_name: "mcphub".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Last lines of stderr, bounded by line count and total characters.
#[derive(Debug)]
struct StderrTail {
    lines: Mutex<VecDeque<String>>,
    max_lines: usize,
    max_chars: usize,
}

impl StderrTail {
    fn new(max_lines: usize, max_chars: usize) -> Self {
        Self {
            lines: Mutex::new(VecDeque::new()),
            max_lines: max_lines.max(1),
            max_chars,
        }
    }

    fn push(&self, line: &str) {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        lines.push_back(line.chars().take(self.max_chars).collect());
        while lines.len() > self.max_lines {
            lines.pop_front();
        }
        let mut total: usize = lines.iter().map(|l| l.chars().count()).sum();
        while total > self.max_chars && lines.len() > 1 {
            if let Some(dropped) = lines.pop_front() {
                total -= dropped.chars().count();
            }
        }
    }

    fn snapshot(&self) -> Option<String> {
        let lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        if lines.is_empty() {
            None
        } else {
            Some(lines.iter().cloned().collect::<Vec<_>>().join("\n"))
        }
    }
}

/// State shared with the reader tasks.
struct Shared {
    server_id: String,
    stdin: AsyncMutex<Option<ChildStdin>>,
    pending: PendingRequests,
    notifications: broadcast::Sender<ServerNotification>,
    stderr_tail: StderrTail,
    log_sink: Arc<dyn RuntimeLogSink>,
    /// Fires on stdout EOF or stop.
    closed: CancellationToken,
    /// Fires when the stderr reader exits.
    stderr_done: CancellationToken,
}

impl Shared {
    async fn write_message<T: Serialize>(&self, message: &T) -> Result<(), McpClientError> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');

        let mut guard = self.stdin.lock().await;
        let stdin = guard.as_mut().ok_or(McpClientError::ServerStopped)?;
        stdin.write_all(&line).await?;
        stdin.flush().await?;
        Ok(())
    }

    fn log(&self, level: RuntimeLogLevel, line: impl Into<String>) {
        self.log_sink.append(&self.server_id, level, line.into());
    }

    async fn dispatch(self: &Arc<Self>, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        match Incoming::parse(trimmed) {
            Ok(Incoming::Response { id, outcome }) => {
                let outcome = outcome.map_err(McpClientError::from);
                if !self.pending.complete(&id, outcome) {
                    debug!(server_id = %self.server_id, %id, "Dropping response with no pending request");
                }
            }
            Ok(Incoming::Request { id, method, .. }) => {
                let reply = if method == methods::PING {
                    JsonRpcResponse::result(id, json!({}))
                } else {
                    JsonRpcResponse::error(
                        id,
                        JsonRpcError::new(
                            error_codes::METHOD_NOT_FOUND,
                            format!("Method not found: {method}"),
                        ),
                    )
                };
                // Reply off the reader task so a full stdin pipe cannot stall dispatch
                let shared = Arc::clone(self);
                tokio::spawn(async move {
                    if let Err(e) = shared.write_message(&reply).await {
                        debug!(server_id = %shared.server_id, error = %e, "Failed to answer server request");
                    }
                });
            }
            Ok(Incoming::Notification(notification)) => {
                debug!(server_id = %self.server_id, method = %notification.method, "Server notification");
                // No subscribers is fine
                let _ = self.notifications.send(notification);
            }
            Err(_) => {
                // npx and friends print banners on stdout
                debug!(server_id = %self.server_id, line = trimmed, "Skipping non-JSON-RPC output");
                self.log(RuntimeLogLevel::Debug, format!("stdout: {trimmed}"));
            }
        }
    }
}

/// Client for communicating with an MCP server via stdio.
pub struct McpClient {
    config: McpServerConfig,
    options: ClientOptions,
    shared: Arc<Shared>,
    child: AsyncMutex<Option<Child>>,
    capabilities: RwLock<Option<ServerCapabilities>>,
    started: AtomicBool,
    initialized: AtomicBool,
    stopped: AtomicBool,
    readers: CancellationToken,
}

impl McpClient {
    /// Create a client for `config` (not yet started).
    pub fn new(
        config: McpServerConfig,
        options: ClientOptions,
        log_sink: Arc<dyn RuntimeLogSink>,
    ) -> Self {
        let (notifications, _) = broadcast::channel(options.notification_capacity.max(1));
        let shared = Arc::new(Shared {
            server_id: config.id.clone(),
            stdin: AsyncMutex::new(None),
            pending: PendingRequests::new(),
            notifications,
            stderr_tail: StderrTail::new(options.stderr_tail_lines, options.stderr_tail_chars),
            log_sink,
            closed: CancellationToken::new(),
            stderr_done: CancellationToken::new(),
        });

        Self {
            config,
            options,
            shared,
            child: AsyncMutex::new(None),
            capabilities: RwLock::new(None),
            started: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            readers: CancellationToken::new(),
        }
    }

    pub fn server_id(&self) -> &str {
        &self.config.id
    }

    /// Launch the process and perform the MCP handshake.
    ///
    /// On failure the process (if any) is stopped before returning.
    pub async fn start(&self) -> Result<ServerCapabilities, McpClientError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(McpClientError::ServerStopped);
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(McpClientError::AlreadyStarted);
        }

        if let Err(e) = self.spawn_process().await {
            self.shared
                .log(RuntimeLogLevel::Error, format!("Launch failed: {e}"));
            self.stop().await;
            return Err(e);
        }

        match self.handshake().await {
            Ok(capabilities) => Ok(capabilities),
            Err(e) => {
                let e = self.enrich_handshake_error(e).await;
                self.shared
                    .log(RuntimeLogLevel::Error, format!("Handshake failed: {e}"));
                self.stop().await;
                Err(e)
            }
        }
    }

    async fn spawn_process(&self) -> Result<(), McpClientError> {
        if self.config.transport != McpTransport::Stdio {
            return Err(McpClientError::Launch {
                command: self.config.display_command(),
                reason: "only stdio transport can be launched".to_string(),
            });
        }

        let working_dir = self
            .config
            .working_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(Path::new);

        if let Some(dir) = working_dir {
            validate_working_dir(dir).map_err(|reason| McpClientError::Launch {
                command: self.config.display_command(),
                reason,
            })?;
        }

        let resolved = resolve_executable(&self.config.command, working_dir)?;
        let exe = resolved.resolved_path;

        let mut command = Command::new(&exe);
        command
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(path) = build_effective_path(&exe, std::env::var_os("PATH").as_ref()) {
            command.env("PATH", path);
        }
        // Config overrides win, including PATH
        command.envs(&self.config.env);

        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let attempted = if self.config.args.is_empty() {
            exe.display().to_string()
        } else {
            format!("{} {}", exe.display(), self.config.args.join(" "))
        };

        let mut child = command.spawn().map_err(|e| McpClientError::Launch {
            command: attempted.clone(),
            reason: e.to_string(),
        })?;

        let pipes = (child.stdin.take(), child.stdout.take(), child.stderr.take());
        let (Some(stdin), Some(stdout), Some(stderr)) = pipes else {
            let _ = child.start_kill();
            return Err(McpClientError::Launch {
                command: attempted,
                reason: "failed to capture stdio pipes".to_string(),
            });
        };

        info!(
            server_id = %self.config.id,
            command = %attempted,
            pid = ?child.id(),
            "MCP server process launched"
        );
        self.shared
            .log(RuntimeLogLevel::Info, format!("Launched: {attempted}"));

        *self.shared.stdin.lock().await = Some(stdin);
        *self.child.lock().await = Some(child);

        spawn_stdout_reader(Arc::clone(&self.shared), stdout, self.readers.clone());
        spawn_stderr_reader(Arc::clone(&self.shared), stderr, self.readers.clone());

        Ok(())
    }

    async fn handshake(&self) -> Result<ServerCapabilities, McpClientError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": self.options.client_name,
                "version": self.options.client_version,
            }
        });

        let value = self.request(methods::INITIALIZE, Some(params)).await?;
        let result: InitializeResult = serde_json::from_value(value)
            .map_err(|e| McpClientError::protocol(format!("invalid initialize result: {e}")))?;
        let capabilities = ServerCapabilities::from(result);

        *self
            .capabilities
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(capabilities.clone());
        self.initialized.store(true, Ordering::SeqCst);

        self.shared
            .write_message(&JsonRpcNotification::new(methods::INITIALIZED, None))
            .await?;

        debug!(
            server_id = %self.config.id,
            protocol_version = %capabilities.protocol_version,
            "MCP handshake complete"
        );

        Ok(capabilities)
    }

    /// Attach the stderr tail to a handshake failure.
    async fn enrich_handshake_error(&self, err: McpClientError) -> McpClientError {
        // A crashing server writes its reason just before exiting
        let _ = timeout(STDERR_DRAIN_WAIT, self.shared.stderr_done.cancelled()).await;
        let stderr_tail = self.shared.stderr_tail.snapshot();

        match err {
            McpClientError::Rpc { code, message, .. } => McpClientError::Protocol {
                message: format!("initialize rejected (code {code}): {message}"),
                stderr_tail,
            },
            McpClientError::Timeout {
                method, timeout, ..
            } => McpClientError::Timeout {
                method,
                timeout,
                stderr_tail,
            },
            McpClientError::StreamClosed => McpClientError::Protocol {
                message: "server exited during initialize".to_string(),
                stderr_tail,
            },
            McpClientError::Io(e) => McpClientError::Protocol {
                message: format!("failed to write to server: {e}"),
                stderr_tail,
            },
            McpClientError::Protocol { message, .. } => McpClientError::Protocol {
                message,
                stderr_tail,
            },
            other => other,
        }
    }

    /// Send a request and wait for its response.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpClientError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(McpClientError::ServerStopped);
        }

        let id = Uuid::new_v4().to_string();
        let rx = self.shared.pending.register(id.clone());

        // Re-check after registering: stop and EOF drain the table after
        // flipping these flags
        if self.stopped.load(Ordering::SeqCst) {
            self.shared.pending.remove(&id);
            return Err(McpClientError::ServerStopped);
        }
        if self.shared.closed.is_cancelled() {
            self.shared.pending.remove(&id);
            return Err(McpClientError::StreamClosed);
        }

        if let Err(e) = self
            .shared
            .write_message(&JsonRpcRequest::new(&id, method, params))
            .await
        {
            self.shared.pending.remove(&id);
            return Err(e);
        }

        match timeout(self.options.request_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(McpClientError::StreamClosed),
            Err(_) => {
                self.shared.pending.remove(&id);
                warn!(
                    server_id = %self.config.id,
                    %method,
                    timeout = ?self.options.request_timeout,
                    "MCP request timed out"
                );
                Err(McpClientError::Timeout {
                    method: method.to_string(),
                    timeout: self.options.request_timeout,
                    stderr_tail: None,
                })
            }
        }
    }

    fn ensure_initialized(&self) -> Result<(), McpClientError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(McpClientError::ServerStopped);
        }
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(McpClientError::NotInitialized);
        }
        Ok(())
    }

    /// List available tools, following pagination.
    ///
    /// A server that did not advertise the `tools` capability has no tools;
    /// no request is sent.
    pub async fn list_tools(&self) -> Result<Vec<McpTool>, McpClientError> {
        self.ensure_initialized()?;

        if !self
            .capabilities()
            .is_some_and(|c| c.supports_tools())
        {
            return Ok(Vec::new());
        }

        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_TOOL_PAGES {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let value = self.request(methods::TOOLS_LIST, params).await?;
            let page: ToolsListPage = serde_json::from_value(value)
                .map_err(|e| McpClientError::protocol(format!("invalid tools/list result: {e}")))?;
            tools.extend(page.tools);

            match page.next_cursor {
                Some(next) if !next.is_empty() && cursor.as_deref() != Some(next.as_str()) => {
                    cursor = Some(next);
                }
                _ => return Ok(tools),
            }
        }

        warn!(server_id = %self.config.id, "tools/list pagination limit reached");
        Ok(tools)
    }

    /// Call a tool.
    ///
    /// An RPC-level error comes back as `McpToolResult::Error`; only
    /// transport failures are `Err`.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<McpToolResult, McpClientError> {
        self.ensure_initialized()?;

        let params = json!({
            "name": name,
            "arguments": arguments,
        });

        match self.request(methods::TOOLS_CALL, Some(params)).await {
            Ok(value) => {
                let result: CallToolResult = serde_json::from_value(value).map_err(|e| {
                    McpClientError::protocol(format!("invalid tools/call result: {e}"))
                })?;
                Ok(McpToolResult::Success {
                    content: result.content.unwrap_or_else(|| json!([])),
                    is_error: result.is_error,
                })
            }
            Err(McpClientError::Rpc {
                code,
                message,
                data,
            }) => Ok(McpToolResult::Error {
                code,
                message,
                data,
            }),
            Err(e) => Err(e),
        }
    }

    /// Stop the server process. Idempotent.
    ///
    /// Pending requests fail with `ServerStopped`, stdin is closed, then the
    /// process gets a graceful terminate and, if needed, a forced kill.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.initialized.store(false, Ordering::SeqCst);

        let failed = self
            .shared
            .pending
            .fail_all(|| McpClientError::ServerStopped);
        self.readers.cancel();

        // A writer blocked on a full pipe holds the lock; the kill below
        // unblocks it and the pipe is dropped with the client
        if let Ok(mut stdin) = self.shared.stdin.try_lock() {
            stdin.take();
        }

        let child = self.child.lock().await.take();
        if let Some(mut child) = child {
            match shutdown_child(
                &mut child,
                self.options.graceful_stop_timeout,
                self.options.kill_timeout,
            )
            .await
            {
                Ok(Some(status)) => {
                    debug!(server_id = %self.config.id, %status, "MCP server process exited");
                }
                Ok(None) => {
                    warn!(server_id = %self.config.id, "MCP server process not reaped after kill");
                }
                Err(e) => {
                    warn!(server_id = %self.config.id, error = %e, "Failed to stop MCP server process");
                }
            }
            self.shared
                .log(RuntimeLogLevel::Info, "Server process stopped");
        }

        self.shared.closed.cancel();

        info!(
            server_id = %self.config.id,
            failed_requests = failed,
            "MCP client stopped"
        );
    }

    /// Resolves once stdout hits EOF or the client is stopped.
    pub async fn closed(&self) {
        self.shared.closed.cancelled().await;
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.is_cancelled()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Capabilities negotiated during the handshake.
    pub fn capabilities(&self) -> Option<ServerCapabilities> {
        self.capabilities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to server-initiated notifications.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<ServerNotification> {
        self.shared.notifications.subscribe()
    }

    /// Number of requests awaiting a response.
    pub fn pending_requests(&self) -> usize {
        self.shared.pending.len()
    }

    /// Recent stderr output, if any.
    pub fn stderr_tail(&self) -> Option<String> {
        self.shared.stderr_tail.snapshot()
    }
}

impl Drop for McpClient {
    fn drop(&mut self) {
        // kill_on_drop reaps the process
        self.readers.cancel();
    }
}

fn spawn_stdout_reader(shared: Arc<Shared>, stdout: ChildStdout, cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut buf: Vec<u8> = Vec::with_capacity(4096);

        loop {
            let line = tokio::select! {
                () = cancel.cancelled() => break,
                line = next_line(&mut reader, &mut buf) => line,
            };

            match line {
                Ok(Some(line)) => shared.dispatch(&line).await,
                Ok(None) => {
                    debug!(server_id = %shared.server_id, "MCP server stdout closed");
                    shared.log(RuntimeLogLevel::Warn, "Server closed its output stream");
                    break;
                }
                Err(e) => {
                    debug!(server_id = %shared.server_id, error = %e, "stdout reader exiting due to read error");
                    break;
                }
            }
        }

        // Mark closed before draining so new requests see it
        shared.closed.cancel();
        shared.pending.fail_all(|| McpClientError::StreamClosed);
        debug!(server_id = %shared.server_id, "stdout reader task exiting");
    });
}

fn spawn_stderr_reader(shared: Arc<Shared>, stderr: ChildStderr, cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            let line = tokio::select! {
                () = cancel.cancelled() => break,
                line = next_line(&mut reader, &mut buf) => line,
            };

            match line {
                Ok(Some(line)) => {
                    debug!(server_id = %shared.server_id, "stderr: {}", line);
                    shared.stderr_tail.push(&line);
                    let level = RuntimeLogLevel::from_stderr_line(&line);
                    shared.log(level, line);
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(server_id = %shared.server_id, error = %e, "stderr reader exiting due to read error");
                    break;
                }
            }
        }

        shared.stderr_done.cancel();
    });
}

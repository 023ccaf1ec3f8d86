//! Scriptable stdio MCP server used by the integration tests.
//!
//! Usage:
//!
//! ```text
//! fake_mcp_server [mode]
//! ```
//!
//! Modes:
//!
//! - `normal` (default): tools `echo`, `sleep`, `fail`, `flagged`, `hang`
//! - `paginated`: same tools, `tools/list` split over two pages
//! - `no-tools`: advertises no `tools` capability
//! - `crash-on-init`: writes a reason to stderr and exits on `initialize`
//! - `exit-after-list`: exits right after answering `tools/list`
//! - `ping-first`: pings the client after `notifications/initialized` and
//!   reports the reply on stderr
//!
//! Tool calls run concurrently, so a slow `sleep` never blocks a later
//! `echo`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::Mutex;

type Out = Arc<Mutex<Stdout>>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Paginated,
    NoTools,
    CrashOnInit,
    ExitAfterList,
    PingFirst,
}

impl Mode {
    fn parse(arg: Option<&str>) -> Self {
        match arg {
            Some("paginated") => Self::Paginated,
            Some("no-tools") => Self::NoTools,
            Some("crash-on-init") => Self::CrashOnInit,
            Some("exit-after-list") => Self::ExitAfterList,
            Some("ping-first") => Self::PingFirst,
            _ => Self::Normal,
        }
    }
}

async fn send(out: &Out, message: &Value) {
    let mut line = message.to_string();
    line.push('\n');
    let mut stdout = out.lock().await;
    // The client may already be gone
    let _ = stdout.write_all(line.as_bytes()).await;
    let _ = stdout.flush().await;
}

fn reply(id: &Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn reply_error(id: &Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

fn tool(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": { "type": "object" }
    })
}

fn text(value: impl Into<String>) -> Value {
    json!({ "content": [{ "type": "text", "text": value.into() }], "isError": false })
}

async fn call_tool(out: Out, id: Value, params: Value) {
    let name = params["name"].as_str().unwrap_or_default().to_string();
    let arguments = &params["arguments"];

    let response = match name.as_str() {
        "echo" => reply(&id, text(arguments["text"].as_str().unwrap_or_default())),
        "sleep" => {
            let ms = arguments["ms"].as_u64().unwrap_or(100);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            reply(&id, text(format!("slept {ms}")))
        }
        "fail" => reply_error(&id, -32602, "bad arguments"),
        "flagged" => reply(
            &id,
            json!({ "content": [{ "type": "text", "text": "tool failed" }], "isError": true }),
        ),
        "hang" => return,
        other => reply_error(&id, -32601, &format!("unknown tool: {other}")),
    };
    send(&out, &response).await;
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mode = Mode::parse(std::env::args().nth(1).as_deref());
    let out: Out = Arc::new(Mutex::new(tokio::io::stdout()));
    let mut stderr = tokio::io::stderr();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Launchers like npx print banners; the client must skip them
    {
        let mut stdout = out.lock().await;
        let _ = stdout.write_all(b"fake-mcp-server booting\n").await;
        let _ = stdout.flush().await;
    }
    let _ = stderr.write_all(b"INFO fake server ready\n").await;

    let tools = vec![
        tool("echo", "Echo the text argument"),
        tool("sleep", "Sleep for ms milliseconds"),
        tool("fail", "Always fails with invalid params"),
        tool("flagged", "Succeeds with isError set"),
        tool("hang", "Never answers"),
    ];

    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(message) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        let id = message.get("id").cloned();
        let method = message["method"].as_str().map(str::to_string);

        match (id, method.as_deref()) {
            (Some(id), Some("initialize")) => {
                if mode == Mode::CrashOnInit {
                    let _ = stderr
                        .write_all(b"ERROR fatal: cannot load configuration\n")
                        .await;
                    let _ = stderr.flush().await;
                    std::process::exit(1);
                }
                let capabilities = if mode == Mode::NoTools {
                    json!({})
                } else {
                    json!({ "tools": {} })
                };
                let result = json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": capabilities,
                    "serverInfo": { "name": "fake-mcp-server", "version": "0.1.0" }
                });
                send(&out, &reply(&id, result)).await;
            }
            (None, Some("notifications/initialized")) => {
                if mode == Mode::PingFirst {
                    send(
                        &out,
                        &json!({ "jsonrpc": "2.0", "id": "srv-1", "method": "ping" }),
                    )
                    .await;
                    send(
                        &out,
                        &json!({
                            "jsonrpc": "2.0",
                            "method": "notifications/message",
                            "params": { "level": "info", "data": "hello" }
                        }),
                    )
                    .await;
                }
            }
            (Some(id), Some("tools/list")) => {
                let cursor = message["params"]["cursor"].as_str();
                let result = match (mode, cursor) {
                    (Mode::Paginated, None) => {
                        json!({ "tools": tools[..2], "nextCursor": "page-2" })
                    }
                    (Mode::Paginated, Some(_)) => json!({ "tools": tools[2..] }),
                    _ => json!({ "tools": tools }),
                };
                send(&out, &reply(&id, result)).await;
                if mode == Mode::ExitAfterList {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    std::process::exit(0);
                }
            }
            (Some(id), Some("tools/call")) => {
                let params = message.get("params").cloned().unwrap_or(Value::Null);
                tokio::spawn(call_tool(Arc::clone(&out), id, params));
            }
            (Some(id), Some(other)) => {
                send(
                    &out,
                    &reply_error(&id, -32601, &format!("Method not found: {other}")),
                )
                .await;
            }
            // Response to our ping
            (Some(id), None) => {
                let report = format!("INFO ping reply {id}: {}\n", message["result"]);
                let _ = stderr.write_all(report.as_bytes()).await;
                let _ = stderr.flush().await;
            }
            (None, _) => {}
        }
    }
}

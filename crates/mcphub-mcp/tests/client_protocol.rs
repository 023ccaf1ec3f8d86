//! Protocol client tests against the scriptable fake server process.
//!
//! Covers the handshake, request correlation under concurrency, timeout
//! cleanup, RPC errors as tagged results, pagination, server-initiated
//! messages and stop semantics.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{CollectingSink, arguments, eventually, fake_server_config};
use mcphub_core::McpToolResult;
use mcphub_mcp::protocol::error_codes;
use mcphub_mcp::{ClientOptions, McpClient, McpClientError};
use serde_json::json;
use tokio_test::assert_ok;

fn client(mode: &str, options: ClientOptions) -> (McpClient, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::default());
    let client = McpClient::new(fake_server_config("fake", mode), options, sink.clone());
    (client, sink)
}

#[tokio::test]
async fn test_handshake_and_tool_call() {
    let (client, _) = client("normal", ClientOptions::default());

    let capabilities = assert_ok!(client.start().await);
    assert_eq!(capabilities.protocol_version, "2024-11-05");
    assert!(capabilities.supports_tools());
    assert_eq!(
        capabilities.server_info.map(|s| s.name).as_deref(),
        Some("fake-mcp-server")
    );
    assert!(client.is_initialized());

    let tools = assert_ok!(client.list_tools().await);
    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["echo", "sleep", "fail", "flagged", "hang"]);

    let result = assert_ok!(
        client
            .call_tool("echo", arguments(json!({ "text": "hello" })))
            .await
    );
    assert!(result.is_success());
    assert_eq!(result.text(), "hello");

    client.stop().await;
    assert!(client.is_closed());
}

#[tokio::test]
async fn test_second_start_is_rejected() {
    let (client, _) = client("normal", ClientOptions::default());
    assert_ok!(client.start().await);

    assert!(matches!(
        client.start().await,
        Err(McpClientError::AlreadyStarted)
    ));
    client.stop().await;
}

#[tokio::test]
async fn test_concurrent_requests_complete_out_of_order() {
    let (client, _) = client("normal", ClientOptions::default());
    assert_ok!(client.start().await);

    let started = Instant::now();
    let slow = async {
        let result = client
            .call_tool("sleep", arguments(json!({ "ms": 400 })))
            .await;
        (result, started.elapsed())
    };
    let fast = async {
        let result = client
            .call_tool("echo", arguments(json!({ "text": "quick" })))
            .await;
        (result, started.elapsed())
    };

    let ((slow_result, slow_at), (fast_result, fast_at)) = tokio::join!(slow, fast);

    // Each waiter got its own response
    assert_eq!(assert_ok!(slow_result).text(), "slept 400");
    assert_eq!(assert_ok!(fast_result).text(), "quick");
    assert!(fast_at < slow_at);
    assert_eq!(client.pending_requests(), 0);

    client.stop().await;
}

#[tokio::test]
async fn test_timeout_removes_pending_entry() {
    let options = ClientOptions {
        request_timeout: Duration::from_millis(300),
        ..ClientOptions::default()
    };
    let (client, _) = client("normal", options);
    assert_ok!(client.start().await);

    let err = client
        .call_tool("hang", arguments(json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, McpClientError::Timeout { ref method, .. } if method == "tools/call"));
    assert_eq!(client.pending_requests(), 0);

    // The connection stays usable after a timeout
    let result = assert_ok!(
        client
            .call_tool("echo", arguments(json!({ "text": "still here" })))
            .await
    );
    assert_eq!(result.text(), "still here");

    client.stop().await;
}

#[tokio::test]
async fn test_rpc_error_is_tagged_result() {
    let (client, _) = client("normal", ClientOptions::default());
    assert_ok!(client.start().await);

    let result = assert_ok!(client.call_tool("fail", arguments(json!({}))).await);
    match result {
        McpToolResult::Error { code, message, .. } => {
            assert_eq!(code, error_codes::INVALID_PARAMS);
            assert_eq!(message, "bad arguments");
        }
        other => panic!("expected error result, got {other:?}"),
    }

    // Tool-level failure still counts as an RPC success
    let flagged = assert_ok!(client.call_tool("flagged", arguments(json!({}))).await);
    assert!(matches!(
        flagged,
        McpToolResult::Success { is_error: true, .. }
    ));
    assert!(!flagged.is_success());

    client.stop().await;
}

#[tokio::test]
async fn test_paginated_tool_listing() {
    let (client, _) = client("paginated", ClientOptions::default());
    assert_ok!(client.start().await);

    let tools = assert_ok!(client.list_tools().await);
    assert_eq!(tools.len(), 5);
    assert_eq!(tools[2].name, "fail");

    client.stop().await;
}

#[tokio::test]
async fn test_server_without_tools_capability() {
    let (client, _) = client("no-tools", ClientOptions::default());
    let capabilities = assert_ok!(client.start().await);
    assert!(!capabilities.supports_tools());

    assert!(assert_ok!(client.list_tools().await).is_empty());
    client.stop().await;
}

#[tokio::test]
async fn test_crash_during_initialize_reports_stderr() {
    let (client, sink) = client("crash-on-init", ClientOptions::default());

    let err = client.start().await.unwrap_err();
    match &err {
        McpClientError::Protocol {
            message,
            stderr_tail,
        } => {
            assert!(message.contains("initialize"));
            assert!(
                stderr_tail
                    .as_deref()
                    .is_some_and(|t| t.contains("cannot load configuration"))
            );
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
    assert!(err.to_string().contains("cannot load configuration"));
    assert!(client.is_closed());
    assert!(sink.contains("Handshake failed"));
}

#[tokio::test]
async fn test_stop_fails_pending_requests() {
    let (client, _) = client("normal", ClientOptions::default());
    let client = Arc::new(client);
    assert_ok!(client.start().await);

    let waiter = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.call_tool("hang", arguments(json!({}))).await })
    };
    assert!(eventually(Duration::from_secs(2), || client.pending_requests() == 1).await);

    client.stop().await;

    let outcome = assert_ok!(waiter.await);
    assert!(matches!(outcome, Err(McpClientError::ServerStopped)));
    assert_eq!(client.pending_requests(), 0);
    assert!(matches!(
        client.list_tools().await,
        Err(McpClientError::ServerStopped)
    ));
}

#[tokio::test]
async fn test_server_ping_and_notifications() {
    let (client, sink) = client("ping-first", ClientOptions::default());
    let mut notifications = client.subscribe_notifications();
    assert_ok!(client.start().await);

    let notification = assert_ok!(
        tokio::time::timeout(Duration::from_secs(5), notifications.recv()).await
    );
    assert_eq!(assert_ok!(notification).method, "notifications/message");

    // The fake server reports our ping reply on stderr
    assert!(eventually(Duration::from_secs(5), || sink.contains("ping reply \"srv-1\": {}")).await);

    client.stop().await;
}

#[tokio::test]
async fn test_stdout_eof_resolves_closed() {
    let (client, _) = client("exit-after-list", ClientOptions::default());
    assert_ok!(client.start().await);
    assert_ok!(client.list_tools().await);

    assert_ok!(tokio::time::timeout(Duration::from_secs(5), client.closed()).await);
    assert!(matches!(
        client.call_tool("echo", arguments(json!({}))).await,
        Err(McpClientError::StreamClosed)
    ));

    client.stop().await;
}

#[tokio::test]
async fn test_banner_lines_are_skipped_and_logged() {
    let (client, sink) = client("normal", ClientOptions::default());
    assert_ok!(client.start().await);

    assert!(sink.contains("stdout: fake-mcp-server booting"));
    assert!(eventually(Duration::from_secs(2), || sink.contains("fake server ready")).await);

    client.stop().await;
}

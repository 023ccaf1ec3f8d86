//! Call command handler.
//!
//! Starts one server, invokes one tool and prints the result.

use mcphub_core::{McpToolCallRequest, McpToolResult};
use serde_json::{Map, Value};

use super::watch_events;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Parse `--args` into a JSON object. Absent means no arguments.
pub fn parse_arguments(raw: Option<&str>) -> Result<Map<String, Value>, CliError> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CliError::Arguments(format!(
            "tool arguments must be a JSON object, got {other}"
        ))),
        Err(e) => Err(CliError::Arguments(format!("invalid JSON arguments: {e}"))),
    }
}

/// Execute the call command.
pub async fn execute(
    ctx: &CliContext,
    server: &str,
    tool: &str,
    raw_args: Option<&str>,
) -> Result<(), CliError> {
    let arguments = parse_arguments(raw_args)?;
    let config = ctx
        .document
        .server(server)
        .cloned()
        .ok_or_else(|| CliError::Arguments(format!("unknown server '{server}'")))?;

    let progress = watch_events(ctx);
    let result = async {
        ctx.hub.register_server(config.with_auto_start(false)).await?;
        ctx.hub.start_server(server).await?;
        let request = McpToolCallRequest::new(server, tool, arguments);
        Ok::<_, CliError>(ctx.hub.call_tool(request).await?)
    }
    .await;
    ctx.hub.shutdown().await;
    progress.abort();

    match result? {
        McpToolResult::Error { code, message, .. } => Err(CliError::Tool { code, message }),
        success @ McpToolResult::Success { .. } => {
            let text = success.text();
            if text.is_empty() {
                if let McpToolResult::Success { content, .. } = &success {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(content).unwrap_or_default()
                    );
                }
            } else {
                println!("{text}");
            }
            if !success.is_success() {
                eprintln!("(the tool reported an error)");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        assert!(parse_arguments(None).unwrap().is_empty());

        let map = parse_arguments(Some(r#"{"path":"/tmp","depth":2}"#)).unwrap();
        assert_eq!(map["depth"], 2);

        assert!(matches!(
            parse_arguments(Some("[1,2]")),
            Err(CliError::Arguments(_))
        ));
        assert!(matches!(
            parse_arguments(Some("{oops")),
            Err(CliError::Arguments(_))
        ));
    }
}

//! Tools command handler.
//!
//! Starts the selected servers, prints the tools they expose, then shuts
//! everything down.

use mcphub_core::McpServerStatus;
use tracing::warn;

use super::watch_events;
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_string};

/// Execute the tools command.
///
/// Without `server`, every trusted server is started. Start failures are
/// reported per server and do not abort the listing.
pub async fn execute(
    ctx: &CliContext,
    server: Option<&str>,
    show_logs: bool,
) -> Result<(), CliError> {
    if let Some(id) = server {
        if ctx.document.server(id).is_none() {
            return Err(CliError::Arguments(format!("unknown server '{id}'")));
        }
    }

    let progress = watch_events(ctx);
    let result = list_tools(ctx, server, show_logs).await;
    ctx.hub.shutdown().await;
    progress.abort();
    result
}

async fn list_tools(
    ctx: &CliContext,
    server: Option<&str>,
    show_logs: bool,
) -> Result<(), CliError> {
    // Auto-start is the caller's choice here, not the document's
    let configs = ctx
        .document
        .servers
        .iter()
        .filter(|s| server.is_none_or(|id| s.id == id))
        .map(|s| s.clone().with_auto_start(false));
    for rejected in ctx.hub.register_all(configs).await {
        warn!(error = %rejected, "Skipping server");
    }

    for info in ctx.hub.list_servers() {
        if server.is_none() && !info.config.trusted {
            continue;
        }
        if let Err(e) = ctx.hub.start_server(info.id()).await {
            warn!(server_id = %info.id(), error = %e, "Server did not start");
        }
    }

    for info in ctx.hub.list_servers() {
        println!("\n{} ({})", info.config.name, info.id());
        print_separator(60);

        match info.status {
            McpServerStatus::Running if info.tools.is_empty() => println!("  (no tools)"),
            McpServerStatus::Running => {
                for tool in &info.tools {
                    println!(
                        "  {:<28} {}",
                        truncate_string(&tool.name, 27),
                        tool.description.as_deref().unwrap_or("")
                    );
                }
            }
            status => println!("  {}", status_line(status, info.error.as_deref())),
        }

        if show_logs {
            let logs = ctx.hub.server_runtime_logs(info.id())?;
            for entry in logs {
                println!(
                    "  {} {:<5} {}",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.level,
                    entry.message
                );
            }
        }
    }

    Ok(())
}

/// Status of a server that is not running, with its last error if any.
fn status_line(status: McpServerStatus, error: Option<&str>) -> String {
    error.map_or_else(|| status.to_string(), |e| format!("{status}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_appends_error() {
        assert_eq!(status_line(McpServerStatus::Stopped, None), "stopped");
        assert_eq!(
            status_line(McpServerStatus::Error, Some("spawn failed")),
            "error: spawn failed"
        );
    }
}

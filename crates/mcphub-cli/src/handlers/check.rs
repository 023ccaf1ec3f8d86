//! Check command handler.
//!
//! Runs every configured server through the security gate and executable
//! resolution, without launching anything.

use std::path::Path;

use mcphub_mcp::resolver::resolve_executable;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the check command.
///
/// Prints one verdict per server and fails if any server would be refused.
pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let servers = &ctx.document.servers;
    let mut failed = 0;

    for server in servers {
        if let Err(e) = ctx.gate.validate(server) {
            println!("✗ {}: {e}", server.id);
            failed += 1;
            continue;
        }

        let working_dir = server
            .working_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(Path::new);

        match resolve_executable(&server.command, working_dir) {
            Ok(resolved) => {
                println!("✓ {}: {}", server.id, resolved.resolved_path.display());
            }
            Err(e) => {
                println!("✗ {}: {e}", server.id);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CliError::CheckFailed {
            failed,
            total: servers.len(),
        });
    }

    println!("\nAll {} server(s) passed.", servers.len());
    Ok(())
}

//! Servers command handler.
//!
//! Lists the configured servers without starting anything.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_optional, print_separator, truncate_string, yes_no};

/// Execute the servers command.
pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let servers = &ctx.document.servers;

    if servers.is_empty() {
        println!("No servers configured.");
        return Ok(());
    }

    println!("Found {} server(s):\n", servers.len());
    println!(
        "{:<16} {:<20} {:<8} {:<6} {:<10} Command",
        "ID", "Name", "Trusted", "Auto", "Reconnect"
    );
    print_separator(100);

    for server in servers {
        println!(
            "{:<16} {:<20} {:<8} {:<6} {:<10} {}",
            truncate_string(&server.id, 15),
            truncate_string(&server.name, 19),
            yes_no(server.trusted),
            yes_no(server.auto_start),
            yes_no(server.auto_reconnect),
            server.display_command(),
        );
        if server.working_dir.is_some() {
            println!(
                "{:<16} cwd: {}",
                "",
                format_optional(server.working_dir.as_ref(), "--")
            );
        }
    }

    Ok(())
}

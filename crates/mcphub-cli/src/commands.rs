//! Main commands enum.
//!
//! This module defines the available commands for the CLI tool.

use clap::Subcommand;

/// Available commands.
///
/// Every command works on the servers of the loaded configuration document.
#[derive(Subcommand)]
pub enum Commands {
    /// List configured servers
    Servers,

    /// Run the security gate and executable resolution for every server
    Check,

    /// Start servers and print the tools they expose
    Tools {
        /// Only start this server (default: every trusted server)
        #[arg(short, long)]
        server: Option<String>,
        /// Also print each server's runtime log
        #[arg(long)]
        logs: bool,
    },

    /// Call a tool on a server
    Call {
        /// Server id
        server: String,
        /// Tool name
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },
}

//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the MCP server hub.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "mcphub")]
#[command(about = "Launch, inspect and call local MCP servers")]
#[command(version)]
pub struct Cli {
    /// Server configuration document (JSON)
    #[arg(
        short = 'c',
        long = "config",
        env = "MCPHUB_CONFIG",
        global = true,
        default_value = "mcphub.json"
    )]
    pub config: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "mcphub",
            "--verbose",
            "--config",
            "/etc/mcphub.json",
            "servers",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("/etc/mcphub.json"));
        assert_eq!(cli.timeout_secs, 30);
        assert!(matches!(cli.command, Some(Commands::Servers)));
    }

    #[test]
    fn test_call_arguments() {
        let cli = Cli::parse_from([
            "mcphub",
            "call",
            "fs",
            "read_file",
            "--args",
            r#"{"path":"/tmp/a"}"#,
            "--timeout",
            "5",
        ]);
        assert_eq!(cli.timeout_secs, 5);
        match cli.command {
            Some(Commands::Call { server, tool, args }) => {
                assert_eq!(server, "fs");
                assert_eq!(tool, "read_file");
                assert_eq!(args.as_deref(), Some(r#"{"path":"/tmp/a"}"#));
            }
            _ => panic!("expected call command"),
        }
    }

    #[test]
    fn test_tools_filters() {
        let cli = Cli::parse_from(["mcphub", "tools", "--server", "fs", "--logs"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Tools { server: Some(ref s), logs: true }) if s == "fs"
        ));
    }
}

//! CLI-specific error types and mappings.
//!
//! This module provides error types for the CLI adapter and maps them to
//! process exit codes.

use mcphub_core::ConfigError;
use mcphub_mcp::McpHubError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration document could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Hub operation failed.
    #[error("{0}")]
    Hub(#[from] McpHubError),

    /// One or more servers failed a check.
    #[error("{failed} of {total} server(s) failed the check")]
    CheckFailed { failed: usize, total: usize },

    /// The tool answered with a JSON-RPC error.
    #[error("Tool error {code}: {message}")]
    Tool { code: i64, message: String },
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Hub(_) | Self::CheckFailed { .. } | Self::Tool { .. } => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

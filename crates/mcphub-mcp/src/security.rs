//! Pre-launch security gate for MCP server configurations.
//!
//! Every start passes through `SecurityGate::validate` before a process is
//! spawned. The gate never spawns anything or changes hub state; it only
//! reads the configuration and probes the filesystem for absolute commands.

use std::path::Path;
use std::sync::Arc;

use mcphub_core::McpServerConfig;
use thiserror::Error;

use crate::resolver::{FsProvider, SystemFs, command_base_name};

/// Programs that may be launched by bare name.
pub const ALLOWED_COMMANDS: &[&str] = &[
    "npx", "npm", "node", "python", "python3", "uv", "uvx", "docker", "deno", "bun", "pnpm",
    "yarn", "pipx", "java",
];

/// Shell metacharacters rejected in commands and arguments.
pub const FORBIDDEN_CHARS: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '<', '>', '!',
];

/// Reasons a configuration is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    #[error("Server '{server_id}' is not trusted")]
    Untrusted { server_id: String },

    #[error("Command is empty")]
    EmptyCommand,

    #[error("Command '{command}' contains forbidden character '{character}'")]
    ForbiddenCharInCommand { command: String, character: char },

    #[error("Argument {index} ('{argument}') contains forbidden character '{character}'")]
    ForbiddenCharInArgument {
        index: usize,
        argument: String,
        character: char,
    },

    #[error(
        "Command '{command}' is not an allowed program and not an absolute path to an executable"
    )]
    CommandNotAllowed { command: String },

    #[error("Executable not found: {path}")]
    ExecutableNotFound { path: String },
}

/// Validates server configurations before launch.
#[derive(Clone)]
pub struct SecurityGate {
    fs: Arc<dyn FsProvider>,
}

impl std::fmt::Debug for SecurityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityGate").finish_non_exhaustive()
    }
}

impl Default for SecurityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityGate {
    /// Gate backed by the real filesystem.
    pub fn new() -> Self {
        Self::with_fs(Arc::new(SystemFs))
    }

    /// Gate with injected filesystem probing.
    pub fn with_fs(fs: Arc<dyn FsProvider>) -> Self {
        Self { fs }
    }

    /// Check a configuration.
    ///
    /// Trust is checked first, so an untrusted server is refused whatever
    /// its command looks like.
    pub fn validate(&self, config: &McpServerConfig) -> Result<(), SecurityError> {
        if !config.trusted {
            return Err(SecurityError::Untrusted {
                server_id: config.id.clone(),
            });
        }

        let command = config.command.trim();
        if command.is_empty() {
            return Err(SecurityError::EmptyCommand);
        }

        if let Some(character) = find_forbidden(command) {
            return Err(SecurityError::ForbiddenCharInCommand {
                command: command.to_string(),
                character,
            });
        }

        for (index, argument) in config.args.iter().enumerate() {
            if let Some(character) = find_forbidden(argument) {
                return Err(SecurityError::ForbiddenCharInArgument {
                    index,
                    argument: argument.clone(),
                    character,
                });
            }
        }

        if is_allowed_program(command) {
            return Ok(());
        }

        let path = Path::new(command);
        if !path.is_absolute() {
            return Err(SecurityError::CommandNotAllowed {
                command: command.to_string(),
            });
        }

        if !self.fs.check_executable(path).is_existing_file() {
            return Err(SecurityError::ExecutableNotFound {
                path: command.to_string(),
            });
        }

        Ok(())
    }
}

/// Whether the command's base name is on the allow-list.
///
/// Extension-insensitive: `npx.cmd` and `/usr/local/bin/npx` both count as
/// `npx`.
pub fn is_allowed_program(command: &str) -> bool {
    let base = command_base_name(command);
    ALLOWED_COMMANDS.contains(&base.as_str())
}

fn find_forbidden(value: &str) -> Option<char> {
    value.chars().find(|c| FORBIDDEN_CHARS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MockFs;

    fn trusted(command: &str, args: &[&str]) -> McpServerConfig {
        McpServerConfig::stdio(
            "srv",
            "Server",
            command,
            args.iter().map(ToString::to_string).collect(),
        )
        .with_trusted(true)
    }

    fn gate() -> SecurityGate {
        SecurityGate::with_fs(Arc::new(
            MockFs::new()
                .with_executable("/opt/mcp/server")
                .with_plain_file("/opt/mcp/server.js"),
        ))
    }

    #[test]
    fn test_untrusted_always_rejected() {
        let config = trusted("npx", &["-y", "pkg"]).with_trusted(false);
        assert_eq!(
            gate().validate(&config),
            Err(SecurityError::Untrusted {
                server_id: "srv".to_string()
            })
        );
    }

    #[test]
    fn test_allow_listed_commands_accepted() {
        for cmd in ["npx", "uvx", "python3", "docker", "npx.cmd", "NODE.EXE"] {
            assert!(
                gate().validate(&trusted(cmd, &["server"])).is_ok(),
                "{cmd} should be allowed"
            );
        }
    }

    #[test]
    fn test_forbidden_characters_in_command() {
        for cmd in ["npx; rm -rf /", "node && evil", "$(whoami)", "a|b", "x>y"] {
            assert!(matches!(
                gate().validate(&trusted(cmd, &[])),
                Err(SecurityError::ForbiddenCharInCommand { .. })
            ));
        }
    }

    #[test]
    fn test_forbidden_characters_in_arguments() {
        let err = gate()
            .validate(&trusted("npx", &["-y", "pkg`id`"]))
            .unwrap_err();
        assert_eq!(
            err,
            SecurityError::ForbiddenCharInArgument {
                index: 1,
                argument: "pkg`id`".to_string(),
                character: '`',
            }
        );
    }

    #[test]
    fn test_blank_command_rejected() {
        assert_eq!(
            gate().validate(&trusted("   ", &[])),
            Err(SecurityError::EmptyCommand)
        );
    }

    #[test]
    fn test_unknown_bare_command_rejected() {
        assert!(matches!(
            gate().validate(&trusted("bash", &["-c", "echo"])),
            Err(SecurityError::CommandNotAllowed { .. })
        ));
        assert!(matches!(
            gate().validate(&trusted("./server", &[])),
            Err(SecurityError::CommandNotAllowed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_path_must_exist() {
        assert!(gate().validate(&trusted("/opt/mcp/server", &[])).is_ok());
        assert!(gate().validate(&trusted("/opt/mcp/server.js", &[])).is_ok());
        assert_eq!(
            gate().validate(&trusted("/opt/mcp/missing", &[])),
            Err(SecurityError::ExecutableNotFound {
                path: "/opt/mcp/missing".to_string()
            })
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_path_to_allowed_program_skips_probe() {
        // Base name is on the allow-list, no file needs to exist
        assert!(gate().validate(&trusted("/usr/local/bin/npx", &[])).is_ok());
    }
}

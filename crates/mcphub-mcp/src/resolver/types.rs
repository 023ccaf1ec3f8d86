//! Types for executable path resolution.

use std::fmt;
use std::path::PathBuf;

/// Result of resolving a command to an executable path.
#[derive(Debug, Clone)]
pub struct ResolveResult {
    /// The resolved path to the executable.
    pub resolved_path: PathBuf,
    /// Every candidate checked up to and including the winner.
    pub attempts: Vec<Attempt>,
}

/// A single probe of a candidate path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub candidate: PathBuf,
    pub outcome: AttemptOutcome,
}

impl Attempt {
    pub(crate) const fn new(candidate: PathBuf, outcome: AttemptOutcome) -> Self {
        Self { candidate, outcome }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.candidate.display(), self.outcome)
    }
}

/// Possible outcomes when probing a candidate path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// File was found and is executable.
    Ok,
    /// Path does not exist.
    NotFound,
    /// Path exists but is not a file (e.g., directory).
    NotAFile,
    /// File exists but has no execute permission.
    NotExecutable,
    /// Permission denied when checking the path.
    PermissionDenied,
    /// Other I/O error occurred.
    IoError(String),
}

impl AttemptOutcome {
    /// Whether the probe found a regular file, executable or not.
    pub const fn is_existing_file(&self) -> bool {
        matches!(self, Self::Ok | Self::NotExecutable)
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::NotFound => write!(f, "not found"),
            Self::NotAFile => write!(f, "not a file"),
            Self::NotExecutable => write!(f, "not executable"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

/// Error returned when executable resolution fails.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("Command is empty")]
    EmptyCommand,

    #[error(
        "Could not resolve '{command}' to an executable path. Tried:\n{}",
        format_attempts(.attempts)
    )]
    NotResolved {
        command: String,
        attempts: Vec<Attempt>,
    },
}

impl ResolveError {
    pub fn not_resolved(command: impl Into<String>, attempts: Vec<Attempt>) -> Self {
        Self::NotResolved {
            command: command.into(),
            attempts,
        }
    }
}

fn format_attempts(attempts: &[Attempt]) -> String {
    if attempts.is_empty() {
        return "  (no candidates checked)".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("  ✗ {a}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_resolved_lists_every_attempt() {
        let err = ResolveError::not_resolved(
            "npx",
            vec![
                Attempt::new(PathBuf::from("/usr/bin/npx"), AttemptOutcome::NotFound),
                Attempt::new(
                    PathBuf::from("/opt/npx"),
                    AttemptOutcome::NotExecutable,
                ),
            ],
        );

        let msg = err.to_string();
        assert!(msg.contains("'npx'"));
        assert!(msg.contains("/usr/bin/npx: not found"));
        assert!(msg.contains("/opt/npx: not executable"));
    }

    #[test]
    fn test_not_resolved_without_attempts() {
        let err = ResolveError::not_resolved("ghost", Vec::new());
        assert!(err.to_string().contains("no candidates checked"));
    }
}

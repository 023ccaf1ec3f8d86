//! Runtime log entries captured per MCP server.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a runtime log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeLogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl RuntimeLogLevel {
    /// Best-effort severity for a line a server wrote to stderr.
    ///
    /// Servers log everything to stderr (stdout is the protocol channel),
    /// so the level is guessed from the text.
    pub fn from_stderr_line(line: &str) -> Self {
        let lower = line.to_ascii_lowercase();
        if lower.contains("error") || lower.contains("fatal") || lower.contains("panic") {
            Self::Error
        } else if lower.contains("warn") {
            Self::Warn
        } else if lower.contains("debug") || lower.contains("trace") {
            Self::Debug
        } else {
            Self::Info
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for RuntimeLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Honour width specifiers
        f.pad(self.as_str())
    }
}

/// A single runtime log line for a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeLogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: RuntimeLogLevel,
    pub message: String,
}

impl RuntimeLogEntry {
    /// Create a new log entry stamped with the current time.
    pub fn new(level: RuntimeLogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

//! Read-only loader for the persisted server configuration document.
//!
//! The document is owned by an external store; the hub only consumes the
//! list of servers it contains and never writes it back.
//!
//! ```json
//! {
//!   "version": 1,
//!   "servers": [
//!     { "id": "fs", "name": "Filesystem", "command": "npx",
//!       "args": ["-y", "@modelcontextprotocol/server-filesystem", "/tmp"],
//!       "trusted": true, "autoStart": true }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::McpServerConfig;

/// Highest document version this loader understands.
pub const CONFIG_DOCUMENT_VERSION: u32 = 1;

const fn default_version() -> u32 {
    CONFIG_DOCUMENT_VERSION
}

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported config version {found} (max supported {CONFIG_DOCUMENT_VERSION})")]
    UnsupportedVersion { found: u32 },

    #[error("Duplicate server id: {0}")]
    DuplicateId(String),

    #[error("Invalid server '{id}': {reason}")]
    InvalidServer { id: String, reason: String },
}

/// The `{version, servers}` document shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpConfigDocument {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub servers: Vec<McpServerConfig>,
}

impl Default for McpConfigDocument {
    fn default() -> Self {
        Self {
            version: CONFIG_DOCUMENT_VERSION,
            servers: Vec::new(),
        }
    }
}

impl McpConfigDocument {
    /// Parse and validate a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Read, parse and validate a document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Check the version, id uniqueness and each server's structure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version > CONFIG_DOCUMENT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
            });
        }

        let mut seen = HashSet::new();
        for server in &self.servers {
            server
                .validate()
                .map_err(|reason| ConfigError::InvalidServer {
                    id: server.id.clone(),
                    reason,
                })?;
            if !seen.insert(server.id.as_str()) {
                return Err(ConfigError::DuplicateId(server.id.clone()));
            }
        }

        Ok(())
    }

    /// Look up a server by id.
    pub fn server(&self, id: &str) -> Option<&McpServerConfig> {
        self.servers.iter().find(|s| s.id == id)
    }
}

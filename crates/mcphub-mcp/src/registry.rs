//! In-memory tool registry keyed by server id.
//!
//! Entries are replaced wholesale on discovery and removed when a server
//! stops or is unregistered; there is no per-tool mutation.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use mcphub_core::McpTool;

#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Vec<McpTool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tool list for a server.
    pub fn replace(&self, server_id: &str, tools: Vec<McpTool>) {
        self.tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(server_id.to_string(), tools);
    }

    /// Remove a server's entry. Returns whether one existed.
    pub fn remove(&self, server_id: &str) -> bool {
        self.tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(server_id)
            .is_some()
    }

    /// Tools for one server (empty if none registered).
    pub fn tools(&self, server_id: &str) -> Vec<McpTool> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(server_id)
            .cloned()
            .unwrap_or_default()
    }

    /// All tools, grouped by server id, sorted by id.
    pub fn all(&self) -> Vec<(String, Vec<McpTool>)> {
        let mut all: Vec<_> = self
            .tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, tools)| (id.clone(), tools.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

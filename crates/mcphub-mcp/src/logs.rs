//! Per-server runtime log ring buffers.
//!
//! Each server gets a bounded FIFO of `RuntimeLogEntry`; once full, the
//! oldest entry is evicted. Overlong messages are clipped.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use mcphub_core::{RuntimeLogEntry, RuntimeLogLevel};

/// Default number of lines kept per server.
pub const DEFAULT_MAX_LOG_LINES: usize = 500;

/// Default maximum message length, in characters.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 2000;

const ELLIPSIS: char = '…';

/// Ring buffer storing recent log lines for one server.
#[derive(Debug)]
pub struct LogBuffer {
    lines: VecDeque<RuntimeLogEntry>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add an entry, removing the oldest if at capacity.
    pub fn push(&mut self, entry: RuntimeLogEntry) {
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(entry);
    }

    pub fn entries(&self) -> Vec<RuntimeLogEntry> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Log buffers for every server, keyed by id.
///
/// The outer map is only write-locked to add or drop a server's buffer;
/// appends lock the one buffer they touch.
#[derive(Debug)]
pub struct RuntimeLogStore {
    buffers: RwLock<HashMap<String, Arc<Mutex<LogBuffer>>>>,
    max_lines: usize,
    max_message_chars: usize,
}

impl Default for RuntimeLogStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOG_LINES, DEFAULT_MAX_MESSAGE_CHARS)
    }
}

impl RuntimeLogStore {
    pub fn new(max_lines: usize, max_message_chars: usize) -> Self {
        Self {
            buffers: RwLock::new(HashMap::new()),
            max_lines,
            max_message_chars,
        }
    }

    fn buffer(&self, server_id: &str) -> Arc<Mutex<LogBuffer>> {
        if let Some(buffer) = self
            .buffers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(server_id)
        {
            return Arc::clone(buffer);
        }

        let mut buffers = self.buffers.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            buffers
                .entry(server_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(LogBuffer::new(self.max_lines)))),
        )
    }

    /// Append a line for a server, clipping overlong messages.
    pub fn append(&self, server_id: &str, level: RuntimeLogLevel, message: &str) {
        let entry = RuntimeLogEntry::new(level, clip(message, self.max_message_chars));
        self.buffer(server_id)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Snapshot of a server's buffer, oldest first.
    pub fn entries(&self, server_id: &str) -> Vec<RuntimeLogEntry> {
        self.buffers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(server_id)
            .map(|b| b.lock().unwrap_or_else(PoisonError::into_inner).entries())
            .unwrap_or_default()
    }

    /// Empty a server's buffer. Returns whether anything was removed.
    pub fn clear(&self, server_id: &str) -> bool {
        self.buffers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(server_id)
            .is_some_and(|b| {
                let mut buffer = b.lock().unwrap_or_else(PoisonError::into_inner);
                let had_entries = !buffer.is_empty();
                buffer.clear();
                had_entries
            })
    }

    /// Drop a server's buffer entirely.
    pub fn remove(&self, server_id: &str) {
        self.buffers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(server_id);
    }
}

fn clip(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    let mut clipped: String = message.chars().take(max_chars.saturating_sub(1)).collect();
    clipped.push(ELLIPSIS);
    clipped
}

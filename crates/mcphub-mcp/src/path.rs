//! Child process environment helpers.
//!
//! - Build the effective `PATH` for a server process (executable dir first)
//! - Validate the configured working directory

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Build the `PATH` a server process sees.
///
/// The resolved executable's directory goes first so shims like `npx` find
/// the `node` installed next to them, followed by the entries of
/// `inherited` in order. Entries are deduplicated.
///
/// Returns `None` when the entries cannot be joined (an entry contains the
/// separator); the caller then leaves `PATH` untouched.
pub fn build_effective_path(exe_path: &Path, inherited: Option<&OsString>) -> Option<OsString> {
    let mut entries: Vec<PathBuf> = Vec::new();

    if let Some(exe_dir) = exe_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        entries.push(exe_dir.to_path_buf());
    }

    if let Some(current) = inherited {
        entries.extend(std::env::split_paths(current).filter(|e| !e.as_os_str().is_empty()));
    }

    let mut seen = HashSet::new();
    entries.retain(|entry| seen.insert(entry.clone()));

    std::env::join_paths(entries).ok()
}

/// Validate a working directory.
///
/// Returns Ok(()) if the directory exists and is actually a directory.
pub fn validate_working_dir(cwd: &Path) -> Result<(), String> {
    match std::fs::metadata(cwd) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(format!(
            "Working directory path is not a directory: {}",
            cwd.display()
        )),
        Err(_) => Err(format!(
            "Working directory does not exist: {}",
            cwd.display()
        )),
    }
}

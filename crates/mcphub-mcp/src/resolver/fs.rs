//! Filesystem provider trait for testable path resolution.

use super::types::AttemptOutcome;
use std::path::Path;

/// Filesystem probing (injectable for testing).
///
/// Shared by the resolver and the security gate, so it must be usable
/// across threads.
pub trait FsProvider: Send + Sync {
    /// Classify `path` as an executable candidate.
    fn check_executable(&self, path: &Path) -> AttemptOutcome;
}

/// Probes the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFs;

impl FsProvider for SystemFs {
    fn check_executable(&self, path: &Path) -> AttemptOutcome {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                return match e.kind() {
                    std::io::ErrorKind::NotFound => AttemptOutcome::NotFound,
                    std::io::ErrorKind::PermissionDenied => AttemptOutcome::PermissionDenied,
                    _ => AttemptOutcome::IoError(e.to_string()),
                };
            }
        };

        if !metadata.is_file() {
            return AttemptOutcome::NotAFile;
        }

        // Windows has no execute bit; extension decides
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 == 0 {
                return AttemptOutcome::NotExecutable;
            }
        }

        AttemptOutcome::Ok
    }
}

/// In-memory filesystem for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MockFs {
    executables: std::collections::HashSet<std::path::PathBuf>,
    plain_files: std::collections::HashSet<std::path::PathBuf>,
}

#[cfg(test)]
impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_executable(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.executables.insert(path.into());
        self
    }

    /// A file that exists but has no execute permission.
    #[must_use]
    pub fn with_plain_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.plain_files.insert(path.into());
        self
    }
}

#[cfg(test)]
impl FsProvider for MockFs {
    fn check_executable(&self, path: &Path) -> AttemptOutcome {
        if self.executables.contains(path) {
            AttemptOutcome::Ok
        } else if self.plain_files.contains(path) {
            AttemptOutcome::NotExecutable
        } else {
            AttemptOutcome::NotFound
        }
    }
}

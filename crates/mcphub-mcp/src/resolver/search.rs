//! Search strategies for each resolution step.
//!
//! Every strategy records the candidates it probed and stops at the first
//! executable it finds.

use super::env::EnvProvider;
use super::fs::FsProvider;
use super::types::{Attempt, AttemptOutcome};
use std::path::{Path, PathBuf};

/// Extensions probed after the bare name, in order.
pub const EXECUTABLE_EXTENSIONS: &[&str] = &[".cmd", ".bat", ".exe", ".com"];

/// Commands that get the Node.js install directory search.
const NODE_COMMANDS: &[&str] = &["npx", "npm", "node"];

/// Probes candidate locations for an executable.
pub struct ExecutableSearcher<'a> {
    env: &'a dyn EnvProvider,
    fs: &'a dyn FsProvider,
}

impl<'a> ExecutableSearcher<'a> {
    pub fn new(env: &'a dyn EnvProvider, fs: &'a dyn FsProvider) -> Self {
        Self { env, fs }
    }

    /// Probe a command that already names a path.
    ///
    /// The path itself is tried first; when it has no extension, each of
    /// `EXECUTABLE_EXTENSIONS` is appended in turn.
    pub fn search_path_like(&self, path: &Path, attempts: &mut Vec<Attempt>) -> Option<PathBuf> {
        if self.probe(path.to_path_buf(), attempts) {
            return Some(path.to_path_buf());
        }

        if path.extension().is_some() {
            return None;
        }

        for ext in EXECUTABLE_EXTENSIONS {
            let mut candidate = path.as_os_str().to_owned();
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            if self.probe(candidate.clone(), attempts) {
                return Some(candidate);
            }
        }

        None
    }

    /// Search each `PATH` entry in order.
    pub fn search_in_path(&self, command: &str, attempts: &mut Vec<Attempt>) -> Option<PathBuf> {
        let path_var = self.env.get("PATH")?;

        std::env::split_paths(&path_var)
            .filter(|dir| !dir.as_os_str().is_empty())
            .find_map(|dir| self.probe_dir(&dir, command, attempts))
    }

    /// Search well-known Node.js install and version-manager directories.
    ///
    /// Only applies to `npx`, `npm` and `node`.
    pub fn search_node_dirs(&self, command: &str, attempts: &mut Vec<Attempt>) -> Option<PathBuf> {
        if !NODE_COMMANDS.contains(&command) {
            return None;
        }

        self.node_dirs()
            .iter()
            .find_map(|dir| self.probe_dir(dir, command, attempts))
    }

    /// Search platform default directories.
    pub fn search_platform_defaults(
        &self,
        command: &str,
        attempts: &mut Vec<Attempt>,
    ) -> Option<PathBuf> {
        platform_default_dirs()
            .iter()
            .find_map(|dir| self.probe_dir(Path::new(dir), command, attempts))
    }

    fn node_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();

        if let Some(program_files) = self.env.get_path("ProgramFiles") {
            dirs.push(program_files.join("nodejs"));
        }
        if let Some(program_files_x86) = self.env.get_path("ProgramFiles(x86)") {
            dirs.push(program_files_x86.join("nodejs"));
        }
        if let Some(app_data) = self.env.get_path("APPDATA") {
            dirs.push(app_data.join("npm"));
        }
        if let Some(home) = self.env.home_dir() {
            dirs.push(home.join(".volta").join("bin"));
            dirs.push(home.join(".asdf").join("shims"));
        }

        dirs
    }

    /// Probe `dir/command`, then `dir/command<ext>` for each extension.
    fn probe_dir(&self, dir: &Path, command: &str, attempts: &mut Vec<Attempt>) -> Option<PathBuf> {
        std::iter::once(command.to_string())
            .chain(EXECUTABLE_EXTENSIONS.iter().map(|ext| format!("{command}{ext}")))
            .map(|name| dir.join(name))
            .find(|candidate| self.probe(candidate.clone(), attempts))
    }

    fn probe(&self, candidate: PathBuf, attempts: &mut Vec<Attempt>) -> bool {
        let outcome = self.fs.check_executable(&candidate);
        let found = outcome == AttemptOutcome::Ok;
        attempts.push(Attempt::new(candidate, outcome));
        found
    }
}

/// Platform-specific default directories to search.
const fn platform_default_dirs() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/opt/homebrew/bin", // Apple Silicon Homebrew
            "/usr/local/bin",    // Intel Homebrew / manual installs
            "/usr/bin",
            "/bin",
        ]
    }

    #[cfg(windows)]
    {
        &[]
    }

    #[cfg(not(any(target_os = "macos", windows)))]
    {
        &["/usr/local/bin", "/usr/bin", "/bin"]
    }
}

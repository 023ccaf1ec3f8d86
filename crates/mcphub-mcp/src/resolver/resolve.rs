//! Main executable path resolution logic.

use super::env::{EnvProvider, SystemEnv};
use super::fs::{FsProvider, SystemFs};
use super::search::ExecutableSearcher;
use super::types::{ResolveError, ResolveResult};
use std::path::{Path, PathBuf};

/// Resolve a command to an executable path using the real environment.
///
/// Search order:
/// 1. Command contains a path separator: the path itself, then (when it has
///    no extension) `.cmd`, `.bat`, `.exe`, `.com` variants. Relative paths
///    are taken against `working_dir` when one is given.
/// 2. Each `PATH` entry in order, bare name first, then extension variants
/// 3. Node.js install directories (only for `npx`, `npm`, `node`)
/// 4. Platform default directories
pub fn resolve_executable(
    command: &str,
    working_dir: Option<&Path>,
) -> Result<ResolveResult, ResolveError> {
    resolve_executable_with_deps(command, working_dir, &SystemEnv, &SystemFs)
}

/// Resolve with injected dependencies (for testing).
pub fn resolve_executable_with_deps(
    command: &str,
    working_dir: Option<&Path>,
    env: &dyn EnvProvider,
    fs: &dyn FsProvider,
) -> Result<ResolveResult, ResolveError> {
    let command = command.trim();
    if command.is_empty() {
        return Err(ResolveError::EmptyCommand);
    }

    let searcher = ExecutableSearcher::new(env, fs);
    let mut attempts = Vec::new();

    // Step 1: explicit path, no fallback to a search by base name
    if is_path_like(command) {
        let path = match working_dir {
            Some(dir) if Path::new(command).is_relative() => dir.join(command),
            _ => PathBuf::from(command),
        };
        return match searcher.search_path_like(&path, &mut attempts) {
            Some(resolved_path) => Ok(ResolveResult {
                resolved_path,
                attempts,
            }),
            None => Err(ResolveError::not_resolved(command, attempts)),
        };
    }

    // Steps 2-4: bare name
    let found = searcher
        .search_in_path(command, &mut attempts)
        .or_else(|| searcher.search_node_dirs(command, &mut attempts))
        .or_else(|| searcher.search_platform_defaults(command, &mut attempts));

    match found {
        Some(resolved_path) => Ok(ResolveResult {
            resolved_path,
            attempts,
        }),
        None => Err(ResolveError::not_resolved(command, attempts)),
    }
}

/// Whether a command names a path rather than a bare program name.
pub fn is_path_like(command: &str) -> bool {
    command.contains('/') || command.contains('\\')
}

/// Lowercased program name with directory and extension stripped.
///
/// `C:\nodejs\npx.CMD` and `/usr/bin/npx` both yield `npx`.
pub fn command_base_name(command: &str) -> String {
    let file_name = command
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(command)
        .trim();

    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };

    stem.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::env::MockEnv;
    use crate::resolver::fs::MockFs;
    use crate::resolver::types::AttemptOutcome;

    #[test]
    fn test_resolve_absolute_path_success() {
        let env = MockEnv::new();
        let fs = MockFs::new().with_executable("/usr/local/bin/npx");

        let resolved =
            resolve_executable_with_deps("/usr/local/bin/npx", None, &env, &fs).unwrap();

        assert_eq!(resolved.resolved_path, PathBuf::from("/usr/local/bin/npx"));
        assert_eq!(resolved.attempts.len(), 1);
    }

    #[test]
    fn test_resolve_path_like_probes_extensions() {
        let env = MockEnv::new();
        let fs = MockFs::new().with_executable("/opt/tools/server.bat");

        let resolved =
            resolve_executable_with_deps("/opt/tools/server", None, &env, &fs).unwrap();

        assert_eq!(
            resolved.resolved_path,
            PathBuf::from("/opt/tools/server.bat")
        );
        // bare, .cmd, .bat
        assert_eq!(resolved.attempts.len(), 3);
    }

    #[test]
    fn test_resolve_path_like_does_not_fall_back_to_path() {
        let env = MockEnv::new().with_var("PATH", "/usr/bin");
        let fs = MockFs::new().with_executable("/usr/bin/npx");

        let err = resolve_executable_with_deps("/missing/npx", None, &env, &fs).unwrap_err();
        assert!(matches!(err, ResolveError::NotResolved { .. }));
    }

    #[test]
    fn test_relative_path_uses_working_dir() {
        let env = MockEnv::new();
        let fs = MockFs::new().with_executable("/srv/app/bin/server");

        let resolved = resolve_executable_with_deps(
            "bin/server",
            Some(Path::new("/srv/app")),
            &env,
            &fs,
        )
        .unwrap();

        assert_eq!(resolved.resolved_path, PathBuf::from("/srv/app/bin/server"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_in_path() {
        let env = MockEnv::new().with_var("PATH", "/usr/bin:/usr/local/bin");
        let fs = MockFs::new().with_executable("/usr/local/bin/npx");

        let resolved = resolve_executable_with_deps("npx", None, &env, &fs).unwrap();

        assert_eq!(resolved.resolved_path, PathBuf::from("/usr/local/bin/npx"));
    }

    #[test]
    fn test_resolve_node_dirs_after_path() {
        let env = MockEnv::new()
            .with_var("PATH", "")
            .with_var("HOME", "/home/dev");
        let fs = MockFs::new().with_executable("/home/dev/.asdf/shims/node");

        let resolved = resolve_executable_with_deps("node", None, &env, &fs).unwrap();

        assert_eq!(
            resolved.resolved_path,
            PathBuf::from("/home/dev/.asdf/shims/node")
        );
    }

    #[test]
    fn test_resolve_empty_command() {
        let env = MockEnv::new();
        let fs = MockFs::new();

        let result = resolve_executable_with_deps("  ", None, &env, &fs);

        assert!(matches!(result, Err(ResolveError::EmptyCommand)));
    }

    #[test]
    fn test_resolve_not_found_lists_attempts() {
        let env = MockEnv::new().with_var("PATH", "/nowhere");
        let fs = MockFs::new();

        let result = resolve_executable_with_deps("nonexistent", None, &env, &fs);

        if let Err(ResolveError::NotResolved { command, attempts }) = result {
            assert_eq!(command, "nonexistent");
            assert!(!attempts.is_empty());
            assert!(
                attempts
                    .iter()
                    .all(|a| a.outcome == AttemptOutcome::NotFound)
            );
        } else {
            panic!("Expected NotResolved error");
        }
    }

    #[test]
    fn test_command_base_name() {
        assert_eq!(command_base_name("npx"), "npx");
        assert_eq!(command_base_name("npx.cmd"), "npx");
        assert_eq!(command_base_name("C:\\Program Files\\nodejs\\NPX.CMD"), "npx");
        assert_eq!(command_base_name("/usr/bin/python3"), "python3");
        assert_eq!(command_base_name(".hidden"), ".hidden");
    }
}

//! Executable path resolution for MCP server commands.
//!
//! Resolves command names (like "npx") to executable paths across
//! platforms and Node.js installation methods, recording every candidate it
//! probed so a failure can be diagnosed.
//!
//! ## Architecture
//!
//! - `types`: Core types (`ResolveResult`, `Attempt`, `AttemptOutcome`)
//! - `env`: Environment variable access trait (injectable for testing)
//! - `fs`: Filesystem probing trait (injectable for testing)
//! - `search`: Per-step search strategies
//! - `resolve`: Resolution order
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mcphub_mcp::resolver::resolve_executable;
//!
//! let result = resolve_executable("npx", None).unwrap();
//! println!("Resolved to: {}", result.resolved_path.display());
//!
//! for attempt in &result.attempts {
//!     println!("  {attempt}");
//! }
//! ```

mod env;
mod fs;
mod resolve;
mod search;
mod types;

pub use env::{EnvProvider, SystemEnv};
pub use fs::{FsProvider, SystemFs};
pub use resolve::{
    command_base_name, is_path_like, resolve_executable, resolve_executable_with_deps,
};
pub use search::EXECUTABLE_EXTENSIONS;
pub use types::{Attempt, AttemptOutcome, ResolveError, ResolveResult};

#[cfg(test)]
pub use env::MockEnv;
#[cfg(test)]
pub use fs::MockFs;

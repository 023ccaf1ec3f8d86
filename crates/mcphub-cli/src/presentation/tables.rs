//! Table and event formatting utilities for CLI output.

use mcphub_core::McpEvent;

/// Truncates a string to a maximum number of characters, adding "..." if
/// needed.
///
/// # Examples
///
/// ```rust
/// use mcphub_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Format an optional value for table display, returning a default if None.
pub fn format_optional<T: std::fmt::Display>(value: Option<&T>, default: &str) -> String {
    value.map_or_else(|| default.to_string(), ToString::to_string)
}

pub const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// One-line progress rendering of a hub event, written to stderr.
pub fn print_event(event: &McpEvent) {
    match event {
        McpEvent::StatusChanged {
            server_id,
            status,
            error: Some(error),
        } => eprintln!("[{server_id}] {status}: {error}"),
        McpEvent::StatusChanged {
            server_id, status, ..
        } => eprintln!("[{server_id}] {status}"),
        McpEvent::ToolsDiscovered { server_id, tools } => {
            eprintln!("[{server_id}] discovered {} tool(s)", tools.len());
        }
        // Registration and log churn are too noisy for progress output
        McpEvent::ServerRegistered { .. }
        | McpEvent::ServerUnregistered { .. }
        | McpEvent::RuntimeLogsChanged { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_string("", 3), "");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(&"/srv"), "--"), "/srv");
        assert_eq!(format_optional::<String>(None, "--"), "--");
    }
}

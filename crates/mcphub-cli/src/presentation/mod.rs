//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no hub calls, no domain transforms.

pub mod tables;

// Re-export commonly used items
pub use tables::{format_optional, print_event, print_separator, truncate_string, yes_no};

//! Terminal message helpers for the command-line binary.

use console::style;

/// Print an error message to stderr with a styled prefix.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

//! User-facing output.
//!
//! Four message categories, each with its own marker and color: info,
//! warning, error and success. Diagnostics go through `tracing` instead.

use owo_colors::OwoColorize;

/// Print an informational message.
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an error message to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a section header.
pub fn print_header(header: &str) {
    println!("\n{}", header.cyan().bold());
}

/// Format a branch name for inline display.
pub fn format_branch(name: &str) -> String {
    name.bright_green().to_string()
}

/// Format a remote name for inline display.
pub fn format_remote(name: &str) -> String {
    name.bright_cyan().to_string()
}

// Terminal helpers for the CLI

use colored::*;
use std::io::IsTerminal;

/// Print an error message to stderr
pub fn print_error(error: &str) {
    eprintln!("{} {}", "✗ Error:".red().bold(), error);
}

/// Whether stdout is attached to a terminal and can take colors
pub fn stdout_is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

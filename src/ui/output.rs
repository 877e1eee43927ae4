//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Regular output goes to stdout and respects the quiet flag. Debug lines,
//! warnings and errors go to stderr so that `adt creator capabilities > x.json`
//! stays clean.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Render archive entry names as an indented listing.
///
/// The `./` root is omitted and each level of nesting indents by two
/// spaces, so `./roles/run/` prints as `  run/` under `roles/`.
pub fn format_entries<T: AsRef<str>>(entries: &[T]) -> String {
    entries
        .iter()
        .map(|entry| entry.as_ref().trim_start_matches("./"))
        .filter(|name| !name.is_empty())
        .map(|name| {
            let trimmed = name.trim_end_matches('/');
            let depth = trimmed.matches('/').count();
            let leaf = trimmed.rsplit('/').next().unwrap_or(trimmed);
            let suffix = if name.ends_with('/') { "/" } else { "" };
            format!("{}{}{}", "  ".repeat(depth + 1), leaf, suffix)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print backend log lines.
///
/// `Error: ` lines are warnings; `Note: ` and `Debug: ` lines only show in
/// debug mode.
pub fn scaffold_logs<T: AsRef<str>>(lines: &[T], verbosity: Verbosity) {
    for line in lines {
        match line.as_ref().strip_prefix("Error: ") {
            Some(message) => warn(message, verbosity),
            None => debug(line.as_ref(), verbosity),
        }
    }
}

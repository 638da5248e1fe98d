//! Consolidated styling module for terminal output.
//!
//! This module uses the anstyle ecosystem:
//! - anstream for auto-detecting color support
//! - anstyle for composable styling
//! - Semantic style constants for domain-specific use
//!
//! ## stdout vs stderr principle
//!
//! - **stdout**: Primary data output (the worktree table)
//! - **stderr**: Status messages (progress, success, errors, hints, warnings)
//!
//! This separation allows piping (`wt list | grep foo`) without status messages interfering.
//! Use `println!` for primary output, `eprintln!` for status messages.

mod constants;
mod hyperlink;
mod line;

// Re-exports from anstream (auto-detecting output)
pub use anstream::{eprint, eprintln, print, println, stderr, stdout};

// Re-exports from anstyle (for composition)
pub use anstyle::Style as AnstyleStyle;

// Re-export our public types
pub use constants::*;
pub use hyperlink::{Stream, hyperlink_stdout, supports_hyperlinks};
pub use line::{StyledLine, StyledString, truncate_visible};

// ============================================================================
// Verbosity
// ============================================================================

use std::sync::atomic::{AtomicU8, Ordering};

/// Global verbosity level, set at startup.
/// 0 = normal, 1 = verbose (-v), 2+ = debug (-vv)
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Set the global verbosity level.
///
/// Call this once at startup after parsing CLI arguments.
pub fn set_verbosity(level: u8) {
    VERBOSITY.store(level, Ordering::Relaxed);
}

/// Get the current verbosity level.
///
/// - 0: normal (no verbose output)
/// - 1: verbose (`-v`)
/// - 2+: debug (`-vv`) - full debug logging
pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

/// Get terminal width, or `usize::MAX` if detection fails.
///
/// Prefers direct terminal size detection over COLUMNS environment variable,
/// because tools like cargo may set COLUMNS incorrectly.
///
/// Checks stderr first (for status messages), then stdout (for table output).
///
/// When detection fails (piped context, no TTY), returns `usize::MAX` rather than
/// an arbitrary default. Callers that need width-based formatting will produce
/// full output, letting the consumer handle truncation.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) =
        terminal_size::terminal_size_of(std::io::stderr()).or_else(terminal_size::terminal_size)
    {
        return w as usize;
    }

    if let Ok(cols) = std::env::var("COLUMNS")
        && let Ok(width) = cols.parse::<usize>()
    {
        return width;
    }

    usize::MAX
}

/// Calculate visual width of a string, ignoring ANSI escape codes.
///
/// Uses unicode-width for proper handling of wide characters (CJK, emoji).
pub fn visual_width(s: &str) -> usize {
    use ansi_str::AnsiStr;
    use unicode_width::UnicodeWidthStr;
    s.ansi_strip().width()
}

/// Fix dim rendering for terminals that don't handle \e[2m after \e[39m.
///
/// Some terminals don't render dim (\e[2m) correctly when it follows
/// a foreground color reset (\e[39m). This replaces that sequence with
/// a full reset (\e[0m) before dim.
pub fn fix_dim_after_color_reset(s: &str) -> String {
    s.replace("\x1b[39m\x1b[2m", "\x1b[0m\x1b[2m")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styled_string_width() {
        let s = StyledString::raw("hello");
        assert_eq!(s.width(), 5);

        let s = StyledString::raw("↑3 ↓2");
        assert_eq!(s.width(), 5, "↑3 ↓2 should have width 5, not {}", s.text.len());

        let s = StyledString::raw("日本語");
        assert_eq!(s.width(), 6);

        let s = StyledString::raw("🎉");
        assert_eq!(s.width(), 2);
    }

    #[test]
    fn test_styled_line_width() {
        let mut line = StyledLine::new();
        line.push_raw("Branch");
        line.push_raw("  ");
        line.push_raw("↑3 ↓2");
        assert_eq!(line.width(), 13);
    }

    #[test]
    fn test_styled_line_padding() {
        let mut line = StyledLine::new();
        line.push_raw("test");
        assert_eq!(line.width(), 4);

        line.pad_to(10);
        assert_eq!(line.width(), 10);

        line.pad_to(10);
        assert_eq!(line.width(), 10);
    }

    #[test]
    fn test_sparse_column_padding() {
        let mut line1 = StyledLine::new();
        line1.push_raw(format!("{:8}", "branch-a"));
        line1.push_raw("  ");
        line1.push_raw(format!("{:5}", "↑3 ↓2"));
        line1.push_raw("  ");

        let mut line2 = StyledLine::new();
        line2.push_raw(format!("{:8}", "branch-b"));
        line2.push_raw("  ");
        line2.push_raw(" ".repeat(5));
        line2.push_raw("  ");

        assert_eq!(
            line1.width(),
            line2.width(),
            "Rows with and without sparse column data should have same width"
        );
    }

    #[test]
    fn test_reset_code_behavior() {
        // {:#} on Style::new() produces an empty string, not a reset.
        let style_reset = format!("{:#}", anstyle::Style::new());
        assert_eq!(style_reset, "");

        let anstyle_reset = format!("{}", anstyle::Reset);
        assert_eq!(anstyle_reset, "\x1b[0m");

        assert_ne!(style_reset, anstyle_reset);
    }

    #[test]
    fn test_fix_dim_after_color_reset() {
        assert_eq!(
            fix_dim_after_color_reset("\x1b[39m\x1b[2m"),
            "\x1b[0m\x1b[2m"
        );

        assert_eq!(
            fix_dim_after_color_reset("\x1b[36m?\x1b[39m\x1b[2m^\x1b[22m"),
            "\x1b[36m?\x1b[0m\x1b[2m^\x1b[22m"
        );

        assert_eq!(
            fix_dim_after_color_reset("a\x1b[39m\x1b[2mb\x1b[39m\x1b[2mc"),
            "a\x1b[0m\x1b[2mb\x1b[0m\x1b[2mc"
        );

        assert_eq!(fix_dim_after_color_reset("no escapes"), "no escapes");

        assert_eq!(
            fix_dim_after_color_reset("\x1b[39m\x1b[1m"),
            "\x1b[39m\x1b[1m"
        );
    }
}

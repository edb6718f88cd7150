//! Terminal status output shared by all pipeline stages.
//!
//! Everything goes to stderr so stage output files can be piped safely.

use owo_colors::OwoColorize;

/// Verbosity-aware status printer.
///
/// `quiet` suppresses informational lines; warnings and errors always print.
/// `verbosity` 1 enables per-item detail, 2 enables debug lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    quiet: bool,
    verbosity: u8,
}

impl Reporter {
    pub fn new(quiet: bool, verbosity: u8) -> Self {
        Self { quiet, verbosity }
    }

    /// Reporter that prints nothing but warnings and errors.
    pub fn silent() -> Self {
        Self::new(true, 0)
    }

    /// Whether per-item detail lines are shown.
    pub fn shows_detail(&self) -> bool {
        !self.quiet && self.verbosity >= 1
    }

    pub fn info(&self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", message.as_ref());
        }
    }

    pub fn detail(&self, message: impl AsRef<str>) {
        if self.shows_detail() {
            eprintln!("  {}", message.as_ref().dimmed());
        }
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        if !self.quiet && self.verbosity >= 2 {
            eprintln!("  {} {}", "debug:".dimmed(), message.as_ref().dimmed());
        }
    }

    pub fn success(&self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", message.as_ref().green());
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        eprintln!("{}", format!("Warning: {}", message.as_ref()).yellow());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        eprintln!("{}", format!("Error: {}", message.as_ref()).red());
    }

    /// Print an aligned `label: value` summary block.
    pub fn summary(&self, title: &str, rows: &[(&str, String)]) {
        if self.quiet {
            return;
        }
        eprintln!("{}", format_summary(title, rows));
    }
}

/// Render a summary block with labels padded to the widest one.
pub fn format_summary(title: &str, rows: &[(&str, String)]) -> String {
    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = format!("{}:", title);
    for (label, value) in rows {
        let pad = width - label.chars().count();
        out.push_str(&format!("\n  {}:{} {}", label, " ".repeat(pad), value));
    }
    out
}

/// Shorten text to `max_chars` characters for single-line previews.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

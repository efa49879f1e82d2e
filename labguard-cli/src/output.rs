//! Console rendering of progress events.

use std::io::{self, IsTerminal, Write};

use colored::Colorize;
use labguard_core::{EventSink, Reportable};

/// Disable colors when stdout is not a terminal.
pub fn configure_colors() {
    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

/// Prints events one per line; quiet events only reach the debug log.
pub struct ConsoleSink<W = io::Stdout> {
    out: W,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<E: Reportable, W: Write> EventSink<E> for ConsoleSink<W> {
    fn emit(&mut self, event: E) {
        if event.is_quiet() {
            tracing::debug!("{event}");
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", paint(&event.to_string())) {
            tracing::warn!("Failed to write progress line: {e}");
        }
    }
}

/// Color the leading tag of a progress line.
fn paint(line: &str) -> String {
    const TAGS: [&str; 3] = ["[Skipping]", "[Action Required]", "Warning:"];

    if let Some(tag) = TAGS.iter().find(|t| line.starts_with(**t)) {
        let rest = &line[tag.len()..];
        let tag = match *tag {
            "[Skipping]" => tag.yellow(),
            "[Action Required]" => tag.red().bold(),
            _ => tag.yellow().bold(),
        };
        return format!("{tag}{rest}");
    }
    if line == "   -> Success." {
        return line.green().to_string();
    }
    if line.starts_with("   -> FAILED:") || line.starts_with("\nAPI Error:") {
        return line.red().to_string();
    }
    line.to_string()
}

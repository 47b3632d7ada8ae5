use crate::error::{Result, TicketDeskError};
use colored::Colorize;
use serde::Serialize;

/// Terminal output for the CLI
///
/// In JSON mode only [`print_json`](Self::print_json) writes to stdout, so
/// the output can be piped into other tools.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    json: bool,
}

impl OutputFormatter {
    #[must_use]
    pub fn new(json: bool, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { json }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{} {message}", "✓".green().bold());
        }
    }

    pub fn info(&self, message: &str) {
        if !self.json {
            println!("{message}");
        }
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {message}", "warning:".yellow().bold());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {message}", "error:".red().bold());
    }

    /// Print a bare value, e.g. a hash or token meant to be copied
    pub fn plain(&self, value: &str) {
        println!("{value}");
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let rendered = serde_json::to_string_pretty(value)
            .map_err(|e| TicketDeskError::custom(format!("Failed to render JSON: {e}")))?;
        println!("{rendered}");
        Ok(())
    }
}

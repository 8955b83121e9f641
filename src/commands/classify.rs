//! Classify command - shows how a status string is interpreted

use anyhow::Result;
use colored::Colorize;

use crate::models::{Intent, StackStatus};
use crate::monitor::{classify, Verdict};

/// Render the verdict for `status` under `intent` as a single line.
pub fn describe(status: &str, intent: Intent) -> String {
    let status = StackStatus::from(status);
    match classify(&status, intent) {
        Verdict::Continue => format!("{status}: in progress"),
        Verdict::Success => format!("{status}: success"),
        Verdict::Failure(reason) => format!("{status}: failure ({reason})"),
    }
}

/// Execute the classify command
pub fn execute(status: String, intent: Intent) -> Result<()> {
    let line = describe(&status, intent);
    let parsed = StackStatus::from(status.as_str());
    let marker = match classify(&parsed, intent) {
        Verdict::Continue => "…".cyan().bold(),
        Verdict::Success => "✓".green().bold(),
        Verdict::Failure(_) => "✗".red().bold(),
    };
    println!("{marker} {line}");
    Ok(())
}

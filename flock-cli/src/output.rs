//! Output formatting utilities

use chrono::NaiveDateTime;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use flock_core::{ScriptOutcome, ScriptStatus};

/// How a console line is colored and where it goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
    /// Written to stderr
    Error,
}

/// Print one line in the given tone
pub fn say(tone: Tone, msg: &str) {
    match tone {
        Tone::Success => println!("{}", msg.green()),
        Tone::Info => println!("{}", msg.cyan()),
        Tone::Warning => println!("{}", msg.yellow()),
        Tone::Error => eprintln!("{}", msg.red()),
    }
}

/// Console lines reporting what happened to one script
pub fn outcome_lines(outcome: &ScriptOutcome) -> Vec<(Tone, String)> {
    let name = &outcome.name;
    match &outcome.status {
        ScriptStatus::Applied => vec![(Tone::Success, format!("{} was successfully applied.", name))],
        ScriptStatus::AlreadyApplied => vec![(Tone::Info, format!("{} was already applied.", name))],
        ScriptStatus::Empty => vec![(Tone::Warning, format!("{} is empty and was skipped.", name))],
        ScriptStatus::Failed { error } => vec![
            (Tone::Error, format!("{} could not be applied.", name)),
            (Tone::Error, format!("ERROR: {}", error)),
        ],
    }
}

/// Table with the CLI's border preset, wrapping to the terminal width
pub fn create_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

/// Format an optional timestamp, `-` when missing
pub fn format_timestamp(at: Option<&NaiveDateTime>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Shorten a checksum for table display
pub fn short_checksum(checksum: &str) -> &str {
    checksum.get(..8).unwrap_or(checksum)
}

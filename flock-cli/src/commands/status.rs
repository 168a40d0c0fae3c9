//! Status command - compare scripts on disk with the migration table

use anyhow::Result;
use colored::Colorize;
use flock_core::{DuckDbMigrationService, ScriptState};

use crate::output::{self, Tone};

pub fn run(service: &DuckDbMigrationService, json: bool) -> Result<()> {
    let states = service.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&states)?);
        return Ok(());
    }

    if states.is_empty() {
        output::say(Tone::Info, "No scripts found.");
        return Ok(());
    }

    let mut table = output::create_table(&["Script", "State", "Applied at"]);

    let mut pending = 0;
    let mut drifted = 0;
    for state in &states {
        let (label, applied_at) = match state {
            ScriptState::Pending { .. } => {
                pending += 1;
                ("pending".yellow().to_string(), None)
            }
            ScriptState::Applied { applied_at, .. } => {
                ("applied".green().to_string(), applied_at.as_ref())
            }
            ScriptState::Drifted {
                applied_at,
                recorded,
                current,
                ..
            } => {
                drifted += 1;
                let label = format!(
                    "drifted ({} -> {})",
                    output::short_checksum(recorded),
                    output::short_checksum(current)
                );
                (label.red().to_string(), applied_at.as_ref())
            }
            ScriptState::Missing { applied_at, .. } => {
                ("missing".red().to_string(), applied_at.as_ref())
            }
        };
        table.add_row(vec![
            state.name().to_string(),
            label,
            output::format_timestamp(applied_at),
        ]);
    }

    println!("{}", table);
    println!();
    println!("{} pending", pending);
    if drifted > 0 {
        output::say(
            Tone::Warning,
            &format!(
                "{} script(s) changed after they were applied; drift is never re-applied.",
                drifted
            ),
        );
    }

    Ok(())
}

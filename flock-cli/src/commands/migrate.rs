//! Migrate command - apply pending scripts

use anyhow::Result;
use flock_core::{DuckDbMigrationService, RunStatus};

use crate::output::{self, Tone};

/// Returns whether every script succeeded
pub fn run(service: &DuckDbMigrationService, json: bool) -> Result<bool> {
    let report = service.process()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.status() == RunStatus::Succeeded);
    }

    for outcome in &report.outcomes {
        for (tone, line) in output::outcome_lines(outcome) {
            output::say(tone, &line);
        }
    }

    if report.outcomes.is_empty() {
        output::say(Tone::Info, "No scripts found.");
    }
    if report.halted {
        output::say(
            Tone::Warning,
            "Stopped after the first failure; later scripts were not attempted.",
        );
    }

    Ok(report.status() == RunStatus::Succeeded)
}

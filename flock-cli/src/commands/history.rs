//! History command - list applied scripts

use anyhow::Result;
use flock_core::DuckDbMigrationService;

use crate::output::{self, Tone};

pub fn run(service: &DuckDbMigrationService, json: bool) -> Result<()> {
    let records = service.history()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        output::say(Tone::Info, "No scripts have been applied.");
        return Ok(());
    }

    let mut table = output::create_table(&["Script", "Applied at", "Checksum"]);
    for record in &records {
        table.add_row(vec![
            record.script_name.clone(),
            output::format_timestamp(record.applied_at.as_ref()),
            record
                .checksum
                .as_deref()
                .map(output::short_checksum)
                .unwrap_or("-")
                .to_string(),
        ]);
    }

    println!("{}", table);
    Ok(())
}

//! Migration service - applies SQL scripts from a directory
//!
//! Every `*.sql` file in the scripts directory is a migration, applied in
//! filename order. Each script runs in its own transaction together with
//! the history row that marks it applied, so a script is either fully
//! applied and recorded or not at all. Scripts already recorded are skipped,
//! which makes a run idempotent.

use std::collections::{HashMap, HashSet};

use crate::config::{FailurePolicy, MigrationOptions};
use crate::domain::result::Result;
use crate::domain::{
    compute_checksum, MigrationRecord, MigrationReport, Script, ScriptFile, ScriptState,
    ScriptStatus,
};
use crate::ports::{Connection, ConnectionProvider, Transaction};
use crate::services::discovery::{discover_scripts, ensure_scripts_directory};
use crate::services::history::HistoryStore;
use crate::services::splitter::{Statements, StatementSplitter};

/// Service for applying migration scripts
pub struct MigrationService<P: ConnectionProvider> {
    options: MigrationOptions,
    provider: P,
}

impl<P: ConnectionProvider> MigrationService<P> {
    /// Create a new migration service
    pub fn new(options: MigrationOptions, provider: P) -> Self {
        Self { options, provider }
    }

    pub fn options(&self) -> &MigrationOptions {
        &self.options
    }

    /// Apply every pending script
    ///
    /// This is the main entry point. It:
    /// 1. Checks the scripts directory and the other options (no connection yet)
    /// 2. Opens one connection for the whole run
    /// 3. Ensures the migration table exists
    /// 4. Applies pending scripts in filename order, recording each one
    ///
    /// A failed script is rolled back and reported in the returned report;
    /// with `FailurePolicy::Halt` no later script is attempted. Errors returned
    /// here (configuration, connection, storage) mean the run itself broke.
    pub fn process(&self) -> Result<MigrationReport> {
        ensure_scripts_directory(&self.options.scripts_directory)?;
        let splitter = StatementSplitter::new(&self.options.statement_separator)?;
        let store = HistoryStore::new(&self.options.migration_table)?;

        let mut conn = self.provider.open(&self.options.connection_string)?;
        tracing::debug!(
            "Connected ({}), migration table {}",
            conn.dialect(),
            store.table()
        );

        store.ensure_table(&mut conn)?;

        let scripts = discover_scripts(&self.options.scripts_directory)?;
        let mut report = MigrationReport::default();

        for file in &scripts {
            let status = run_script(&mut conn, &store, &splitter, file)?;
            let failed = status.is_failure();
            report.push(&file.name, status);

            if failed && self.options.failure_policy == FailurePolicy::Halt {
                report.halted = true;
                break;
            }
        }

        // conn dropped here, on early returns too
        Ok(report)
    }

    /// Compare the scripts on disk with the migration table, without writing
    ///
    /// Scripts come first in filename order, followed by records whose file
    /// has disappeared, in the order they were applied.
    pub fn status(&self) -> Result<Vec<ScriptState>> {
        ensure_scripts_directory(&self.options.scripts_directory)?;
        let store = HistoryStore::new(&self.options.migration_table)?;

        let mut conn = self.provider.open(&self.options.connection_string)?;
        let records = store.records(&mut conn)?;
        let scripts = discover_scripts(&self.options.scripts_directory)?;

        let by_name: HashMap<&str, &MigrationRecord> = records
            .iter()
            .map(|r| (r.script_name.as_str(), r))
            .collect();
        let on_disk: HashSet<&str> = scripts.iter().map(|s| s.name.as_str()).collect();

        let mut states = Vec::with_capacity(scripts.len());
        for file in &scripts {
            let state = match by_name.get(file.name.as_str()) {
                None => ScriptState::Pending {
                    name: file.name.clone(),
                },
                Some(record) => {
                    let current = compute_checksum(file.load()?.content());
                    if record.has_drifted(&current) {
                        tracing::warn!("{} changed after it was applied", file.name);
                        ScriptState::Drifted {
                            name: file.name.clone(),
                            applied_at: record.applied_at,
                            recorded: record.checksum.clone().unwrap_or_default(),
                            current,
                        }
                    } else {
                        ScriptState::Applied {
                            name: file.name.clone(),
                            applied_at: record.applied_at,
                        }
                    }
                }
            };
            states.push(state);
        }

        states.extend(
            records
                .iter()
                .filter(|r| !on_disk.contains(r.script_name.as_str()))
                .map(|r| ScriptState::Missing {
                    name: r.script_name.clone(),
                    applied_at: r.applied_at,
                }),
        );

        Ok(states)
    }

    /// Every migration record, in the order scripts were applied
    pub fn history(&self) -> Result<Vec<MigrationRecord>> {
        let store = HistoryStore::new(&self.options.migration_table)?;
        let mut conn = self.provider.open(&self.options.connection_string)?;
        store.records(&mut conn)
    }
}

/// Decide and carry out what happens to one script
///
/// Anything that goes wrong with the script itself (reading it, running it,
/// recording it) becomes a `Failed` status. Only history lookups outside the
/// script's transaction return `Err`.
fn run_script<C: Connection>(
    conn: &mut C,
    store: &HistoryStore,
    splitter: &StatementSplitter,
    file: &ScriptFile,
) -> Result<ScriptStatus> {
    if store.has_applied(conn, &file.name)? {
        tracing::info!("{} was already applied", file.name);
        return Ok(ScriptStatus::AlreadyApplied);
    }

    let script = match file.load() {
        Ok(script) => script,
        Err(e) => {
            tracing::error!("{} could not be read: {}", file.name, e);
            return Ok(ScriptStatus::Failed { error: e.detail() });
        }
    };

    let statements = splitter.split(script.content());
    if statements.is_empty() {
        tracing::warn!("{} holds no statements, skipping", file.name);
        return Ok(ScriptStatus::Empty);
    }

    match apply_script(conn, store, &script, statements) {
        Ok(()) => {
            tracing::info!("{} was successfully applied", file.name);
            Ok(ScriptStatus::Applied)
        }
        Err(e) => {
            tracing::error!("{} could not be applied: {}", file.name, e);
            Ok(ScriptStatus::Failed { error: e.detail() })
        }
    }
}

/// Run one script's statements and its history insert in a single transaction
///
/// Any error leaves the database as it was before the script.
fn apply_script<C: Connection>(
    conn: &mut C,
    store: &HistoryStore,
    script: &Script,
    statements: Statements<'_, '_>,
) -> Result<()> {
    let mut tx = conn
        .begin()
        .map_err(|e| e.into_storage("failed to begin transaction"))?;

    for (index, statement) in statements.iter().enumerate() {
        tracing::debug!("{}: executing statement {}", script.name(), index + 1);
        if let Err(e) = tx.execute_batch(statement) {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!("{}: rollback failed: {}", script.name(), rollback_err);
            }
            return Err(e.into_statement());
        }
    }

    // From here on an error drops `tx`, which rolls it back
    let checksum = compute_checksum(script.content());
    store.record(&mut tx, script.name(), &checksum, script.content())?;
    tx.commit()
        .map_err(|e| e.into_storage(&format!("failed to commit {}", script.name())))?;
    Ok(())
}

//! CLI command implementations

pub mod history;
pub mod migrate;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use flock_core::{DuckDbMigrationService, FailurePolicy, MigrationBuilder, SettingsFile};

/// Settings file picked up from the working directory when `--config` is absent
pub const DEFAULT_SETTINGS_FILE: &str = "flock.json";

/// Options shared by every command
///
/// Precedence: flag or `FLOCK_*` variable, then settings file, then defaults.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// JSON settings file [default: ./flock.json if present]
    #[arg(long, global = true, env = "FLOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database connection string (DuckDB file path or :memory:)
    #[arg(long, global = true, env = "FLOCK_CONNECTION_STRING")]
    pub connection: Option<String>,

    /// Migration history table [default: _Migration]
    #[arg(long, global = true, env = "FLOCK_MIGRATION_TABLE")]
    pub table: Option<String>,

    /// Directory holding the *.sql scripts
    #[arg(long, global = true, env = "FLOCK_SCRIPTS_DIRECTORY")]
    pub scripts: Option<PathBuf>,

    /// Line that separates statements inside a script [default: GO]
    #[arg(long, global = true, env = "FLOCK_STATEMENT_SEPARATOR")]
    pub separator: Option<String>,

    /// Keep applying later scripts after one fails
    #[arg(long, global = true)]
    pub continue_on_error: bool,
}

impl RunArgs {
    /// Merge the settings file with flags into a builder
    pub fn builder(&self) -> Result<MigrationBuilder> {
        let mut builder = match self.settings_path() {
            Some(path) => SettingsFile::load(&path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?
                .into_builder(),
            None => MigrationBuilder::new(),
        };

        if let Some(connection) = &self.connection {
            builder = builder.connection_string(connection.as_str());
        }
        if let Some(table) = &self.table {
            builder = builder.migration_table(table.as_str());
        }
        if let Some(scripts) = &self.scripts {
            builder = builder.scripts_directory(scripts.as_path());
        }
        if let Some(separator) = &self.separator {
            builder = builder.statement_separator(separator.as_str());
        }
        if self.continue_on_error {
            builder = builder.failure_policy(FailurePolicy::Continue);
        }

        Ok(builder)
    }

    pub fn build_service(&self) -> Result<DuckDbMigrationService> {
        Ok(self.builder()?.build_duckdb())
    }

    fn settings_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let fallback = Path::new(DEFAULT_SETTINGS_FILE);
                fallback.is_file().then(|| fallback.to_path_buf())
            }
        }
    }
}

//! Flock Core - applies SQL migration scripts exactly once
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: scripts, history records, run reports, checksums, errors
//! - **ports**: trait definitions for the database driver
//! - **services**: statement splitting, history table, the migration engine
//! - **adapters**: concrete implementations (DuckDB)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use adapters::duckdb::DuckDbProvider;

// Re-export commonly used types at crate root
pub use config::{FailurePolicy, MigrationBuilder, MigrationOptions, SettingsFile};
pub use domain::result::{Error, Result};
pub use domain::{
    compute_checksum, MigrationRecord, MigrationReport, RunStatus, Script, ScriptFile,
    ScriptOutcome, ScriptState, ScriptStatus,
};
pub use services::MigrationService;

/// Migration service wired to the DuckDB adapter
pub type DuckDbMigrationService = MigrationService<DuckDbProvider>;

impl MigrationBuilder {
    /// Build a migration service that talks to DuckDB
    pub fn build_duckdb(self) -> DuckDbMigrationService {
        self.build_service(DuckDbProvider::new())
    }
}

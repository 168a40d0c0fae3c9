//! Service layer - migration orchestration
//!
//! The splitter, history store and script discovery are the building blocks;
//! `MigrationService` drives them for a whole run.

pub mod discovery;
pub mod history;
pub mod migration;
pub mod splitter;

pub use discovery::{discover_scripts, ensure_scripts_directory};
pub use history::{HistoryStore, DEFAULT_MIGRATION_TABLE};
pub use migration::MigrationService;
pub use splitter::{StatementSplitter, Statements, DEFAULT_SEPARATOR};

//! Core domain entities
//!
//! Plain data structures with no database access. Scripts and the checksum
//! helper touch the filesystem and hashing only.

pub mod checksum;
mod record;
mod report;
pub mod result;
mod script;

pub use checksum::compute_checksum;
pub use record::MigrationRecord;
pub(crate) use record::parse_timestamp;
pub use report::{MigrationReport, RunStatus, ScriptOutcome, ScriptState, ScriptStatus};
pub use script::{Script, ScriptFile};

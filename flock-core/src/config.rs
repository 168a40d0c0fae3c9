//! Configuration management
//!
//! Options can come from a JSON settings file, from a builder, or both
//! (builder values win). Settings file format:
//! ```json
//! {
//!   "connectionString": "app.duckdb",
//!   "migrationTable": "_Migration",
//!   "scriptsDirectory": "db/scripts",
//!   "statementSeparator": "GO",
//!   "failurePolicy": "halt"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::ports::ConnectionProvider;
use crate::services::history::DEFAULT_MIGRATION_TABLE;
use crate::services::splitter::DEFAULT_SEPARATOR;
use crate::services::MigrationService;

/// What the engine does after a script fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the run; later scripts may depend on the failed one
    #[default]
    Halt,
    /// Report the failure and keep going with the next script
    Continue,
}

/// Everything a migration run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    pub connection_string: String,
    pub migration_table: String,
    pub scripts_directory: PathBuf,
    pub statement_separator: String,
    pub failure_policy: FailurePolicy,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            migration_table: DEFAULT_MIGRATION_TABLE.to_string(),
            scripts_directory: PathBuf::new(),
            statement_separator: DEFAULT_SEPARATOR.to_string(),
            failure_policy: FailurePolicy::Halt,
        }
    }
}

/// Raw settings file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFile {
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub migration_table: Option<String>,
    #[serde(default)]
    pub scripts_directory: Option<PathBuf>,
    #[serde(default)]
    pub statement_separator: Option<String>,
    #[serde(default)]
    pub failure_policy: Option<FailurePolicy>,
}

impl SettingsFile {
    /// Load a settings file
    ///
    /// A relative `scriptsDirectory` is resolved against the file's own
    /// directory, so a settings file can sit next to its scripts.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("cannot read settings file {}: {}", path.display(), e))
        })?;
        let mut settings: SettingsFile = serde_json::from_str(&content).map_err(|e| {
            Error::configuration(format!("invalid settings file {}: {}", path.display(), e))
        })?;

        if let (Some(dir), Some(base)) = (&settings.scripts_directory, path.parent()) {
            if dir.is_relative() {
                settings.scripts_directory = Some(base.join(dir));
            }
        }

        Ok(settings)
    }

    /// Seed a builder with these settings
    pub fn into_builder(self) -> MigrationBuilder {
        MigrationBuilder {
            connection_string: self.connection_string,
            migration_table: self.migration_table,
            scripts_directory: self.scripts_directory,
            statement_separator: self.statement_separator,
            failure_policy: self.failure_policy,
        }
    }
}

/// Builds `MigrationOptions`; blank values are ignored and fall back to defaults
#[derive(Debug, Clone, Default)]
pub struct MigrationBuilder {
    connection_string: Option<String>,
    migration_table: Option<String>,
    scripts_directory: Option<PathBuf>,
    statement_separator: Option<String>,
    failure_policy: Option<FailurePolicy>,
}

impl MigrationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_string(mut self, connection_string: impl Into<String>) -> Self {
        set_if_present(&mut self.connection_string, connection_string.into());
        self
    }

    pub fn migration_table(mut self, migration_table: impl Into<String>) -> Self {
        set_if_present(&mut self.migration_table, migration_table.into());
        self
    }

    pub fn scripts_directory(mut self, scripts_directory: impl Into<PathBuf>) -> Self {
        let dir = scripts_directory.into();
        if !dir.as_os_str().is_empty() {
            self.scripts_directory = Some(dir);
        }
        self
    }

    pub fn statement_separator(mut self, statement_separator: impl Into<String>) -> Self {
        set_if_present(&mut self.statement_separator, statement_separator.into());
        self
    }

    pub fn failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = Some(failure_policy);
        self
    }

    pub fn build(self) -> MigrationOptions {
        let defaults = MigrationOptions::default();
        MigrationOptions {
            connection_string: self.connection_string.unwrap_or(defaults.connection_string),
            migration_table: self.migration_table.unwrap_or(defaults.migration_table),
            scripts_directory: self.scripts_directory.unwrap_or(defaults.scripts_directory),
            statement_separator: self
                .statement_separator
                .unwrap_or(defaults.statement_separator),
            failure_policy: self.failure_policy.unwrap_or(defaults.failure_policy),
        }
    }

    /// Build a migration service over `provider`
    pub fn build_service<P: ConnectionProvider>(self, provider: P) -> MigrationService<P> {
        MigrationService::new(self.build(), provider)
    }
}

fn set_if_present(slot: &mut Option<String>, value: String) {
    if !value.trim().is_empty() {
        *slot = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let options = MigrationBuilder::new().build();
        assert_eq!(options.migration_table, "_Migration");
        assert_eq!(options.statement_separator, "GO");
        assert_eq!(options.failure_policy, FailurePolicy::Halt);
        assert!(options.connection_string.is_empty());
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let options = MigrationBuilder::new()
            .migration_table("history")
            .migration_table("   ")
            .statement_separator("")
            .connection_string("app.duckdb")
            .scripts_directory("")
            .build();
        assert_eq!(options.migration_table, "history");
        assert_eq!(options.statement_separator, "GO");
        assert_eq!(options.connection_string, "app.duckdb");
        assert_eq!(options.scripts_directory, PathBuf::new());
    }

    #[test]
    fn test_settings_file_into_builder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flock.json");
        std::fs::write(
            &path,
            r#"{
                "connectionString": "app.duckdb",
                "scriptsDirectory": "scripts",
                "statementSeparator": ";;",
                "failurePolicy": "continue"
            }"#,
        )
        .unwrap();

        let options = SettingsFile::load(&path)
            .unwrap()
            .into_builder()
            .migration_table("log")
            .build();

        assert_eq!(options.connection_string, "app.duckdb");
        assert_eq!(options.scripts_directory, dir.path().join("scripts"));
        assert_eq!(options.statement_separator, ";;");
        assert_eq!(options.migration_table, "log");
        assert_eq!(options.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_builder_overrides_settings() {
        let settings = SettingsFile {
            connection_string: Some("from-file.duckdb".to_string()),
            ..Default::default()
        };
        let options = settings
            .into_builder()
            .connection_string("from-cli.duckdb")
            .build();
        assert_eq!(options.connection_string, "from-cli.duckdb");
    }

    #[test]
    fn test_invalid_settings_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flock.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SettingsFile::load(&path),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            SettingsFile::load(&dir.path().join("missing.json")),
            Err(Error::Configuration(_))
        ));
    }
}

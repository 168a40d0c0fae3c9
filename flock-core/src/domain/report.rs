//! Outcome of a migration run and per-script state

use chrono::NaiveDateTime;
use serde::Serialize;

/// What happened to one script during `process()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScriptStatus {
    /// Statements and history record committed together
    Applied,
    /// A history record already exists
    AlreadyApplied,
    /// The script holds no statements; nothing was opened or recorded
    Empty,
    /// Rolled back; `error` is the driver's message
    Failed { error: String },
}

impl ScriptStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, ScriptStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: ScriptStatus,
}

/// Final run result, translated to an exit code by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    /// At least one script failed; earlier scripts stay committed
    PartialFailure,
}

/// Result of running migrations
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    /// One entry per script visited, in application order
    pub outcomes: Vec<ScriptOutcome>,
    /// True when a failure stopped the run (halt policy)
    pub halted: bool,
}

impl MigrationReport {
    pub fn status(&self) -> RunStatus {
        if self.outcomes.iter().any(|o| o.status.is_failure()) {
            RunStatus::PartialFailure
        } else {
            RunStatus::Succeeded
        }
    }

    /// Names of newly applied scripts
    pub fn applied(&self) -> Vec<&str> {
        self.names_where(|s| matches!(s, ScriptStatus::Applied))
    }

    /// Names of scripts skipped because they were already recorded
    pub fn already_applied(&self) -> Vec<&str> {
        self.names_where(|s| matches!(s, ScriptStatus::AlreadyApplied))
    }

    pub fn failed(&self) -> Vec<&str> {
        self.names_where(ScriptStatus::is_failure)
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, status: ScriptStatus) {
        self.outcomes.push(ScriptOutcome {
            name: name.into(),
            status,
        });
    }

    fn names_where(&self, pred: impl Fn(&ScriptStatus) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| pred(&o.status))
            .map(|o| o.name.as_str())
            .collect()
    }
}

/// Where a script stands relative to the history table (read-only view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScriptState {
    /// On disk, not recorded
    Pending { name: String },
    /// Recorded, content unchanged
    Applied {
        name: String,
        applied_at: Option<NaiveDateTime>,
    },
    /// Recorded, but the file changed since it was applied
    Drifted {
        name: String,
        applied_at: Option<NaiveDateTime>,
        recorded: String,
        current: String,
    },
    /// Recorded, but the file is gone from the scripts directory
    Missing {
        name: String,
        applied_at: Option<NaiveDateTime>,
    },
}

impl ScriptState {
    pub fn name(&self) -> &str {
        match self {
            ScriptState::Pending { name }
            | ScriptState::Applied { name, .. }
            | ScriptState::Drifted { name, .. }
            | ScriptState::Missing { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_status() {
        let mut report = MigrationReport::default();
        report.push("001.sql", ScriptStatus::AlreadyApplied);
        report.push("002.sql", ScriptStatus::Applied);
        report.push("003.sql", ScriptStatus::Empty);
        assert_eq!(report.status(), RunStatus::Succeeded);
        assert_eq!(report.applied(), vec!["002.sql"]);
        assert_eq!(report.already_applied(), vec!["001.sql"]);

        report.push(
            "004.sql",
            ScriptStatus::Failed {
                error: "boom".to_string(),
            },
        );
        assert_eq!(report.status(), RunStatus::PartialFailure);
        assert_eq!(report.failed(), vec!["004.sql"]);
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let outcome = ScriptOutcome {
            name: "002.sql".to_string(),
            status: ScriptStatus::Failed {
                error: "no such table".to_string(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["name"], "002.sql");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "no such table");
    }
}

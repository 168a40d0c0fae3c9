//! Migration history record

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of the migration table
///
/// Records are append-only: written once when a script is applied and never
/// updated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub script_name: String,
    /// Uppercase hex MD5 of the content at apply time (None for rows written
    /// by tools that did not track checksums)
    pub checksum: Option<String>,
    /// Archived script content
    pub text: Option<String>,
    /// Server-assigned UTC timestamp
    pub applied_at: Option<NaiveDateTime>,
}

impl MigrationRecord {
    /// True when the recorded checksum differs from `current`
    ///
    /// Rows without a checksum can't be compared and never count as drifted.
    pub fn has_drifted(&self, current: &str) -> bool {
        self.checksum
            .as_deref()
            .is_some_and(|recorded| !recorded.eq_ignore_ascii_case(current))
    }
}

/// Parse a DuckDB timestamp rendered as VARCHAR (e.g., "2025-01-15 10:30:00.123456")
pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(checksum: Option<&str>) -> MigrationRecord {
        MigrationRecord {
            script_name: "001_init.sql".to_string(),
            checksum: checksum.map(str::to_string),
            text: None,
            applied_at: None,
        }
    }

    #[test]
    fn test_has_drifted() {
        let r = record(Some("D41D8CD98F00B204E9800998ECF8427E"));
        assert!(!r.has_drifted("D41D8CD98F00B204E9800998ECF8427E"));
        assert!(!r.has_drifted("d41d8cd98f00b204e9800998ecf8427e"));
        assert!(r.has_drifted("900150983CD24FB0D6963F7D28E17F72"));
        assert!(!record(None).has_drifted("900150983CD24FB0D6963F7D28E17F72"));
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2025-01-15 10:30:00.123456").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-01-15 10:30:00");

        assert!(parse_timestamp("2025-01-15 10:30:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }
}

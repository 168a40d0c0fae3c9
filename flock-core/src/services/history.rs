//! History store - the migration log table
//!
//! One row per applied script. Rows are only ever inserted, always inside
//! the transaction that ran the script they describe.

use crate::domain::result::{Error, Result};
use crate::domain::{parse_timestamp, MigrationRecord};
use crate::ports::{Connection, Transaction};

/// Default migration table name
pub const DEFAULT_MIGRATION_TABLE: &str = "_Migration";

/// Access to the migration table of one database
#[derive(Debug, Clone)]
pub struct HistoryStore {
    table: String,
}

impl HistoryStore {
    /// Create a store over `table`
    ///
    /// The name is interpolated into SQL, so only plain identifiers
    /// (letters, digits, underscores; not starting with a digit) are accepted.
    pub fn new(table: &str) -> Result<Self> {
        let table = table.trim();
        if !is_plain_identifier(table) {
            return Err(Error::configuration(format!(
                "migration table name '{}' must be a plain identifier",
                table
            )));
        }
        Ok(Self {
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the table if it doesn't exist; safe to call on every run
    pub fn ensure_table<C: Connection>(&self, conn: &mut C) -> Result<()> {
        conn.ensure_history_table(&self.table)
            .map_err(|e| e.into_storage(&format!("failed to create table {}", self.table)))
    }

    /// Whether the table exists, without creating it
    pub fn exists<C: Connection>(&self, conn: &mut C) -> Result<bool> {
        conn.history_table_exists(&self.table)
            .map_err(|e| e.into_storage(&format!("failed to look up table {}", self.table)))
    }

    /// True iff exactly one record exists for `script_name`
    ///
    /// More than one record means the history was tampered with; that is
    /// reported as a storage error rather than treated as applied.
    pub fn has_applied<C: Connection>(&self, conn: &mut C, script_name: &str) -> Result<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE \"Script\" = ?",
            self.table
        );
        let count = conn
            .query_scalar(&sql, &[script_name])
            .map_err(|e| e.into_storage(&format!("failed to query {}", self.table)))?;

        match count {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(Error::storage(format!(
                "{} holds {} records for script {}; history is corrupted",
                self.table, n, script_name
            ))),
        }
    }

    /// Insert a record inside the caller's transaction
    ///
    /// On error the caller must roll the transaction back.
    pub fn record<T: Transaction>(
        &self,
        tx: &mut T,
        script_name: &str,
        checksum: &str,
        text: &str,
    ) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (\"Script\", \"Checksum\", \"Text\") VALUES (?, ?, ?)",
            self.table
        );
        tx.execute(&sql, &[script_name, checksum, text])
            .map_err(|e| e.into_storage(&format!("failed to record {}", script_name)))?;
        Ok(())
    }

    /// Every record, in the order scripts were applied
    ///
    /// Returns an empty list when the table hasn't been created yet.
    pub fn records<C: Connection>(&self, conn: &mut C) -> Result<Vec<MigrationRecord>> {
        if !self.exists(conn)? {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT \"Script\", \"Checksum\", \"Text\", CAST(\"ExecutionDate\" AS VARCHAR)
             FROM {} ORDER BY \"Id\"",
            self.table
        );
        let rows = conn
            .query_rows(&sql, 4)
            .map_err(|e| e.into_storage(&format!("failed to read {}", self.table)))?;

        let records = rows
            .into_iter()
            .map(|mut row| {
                let applied_at = row[3].take().as_deref().and_then(parse_timestamp);
                MigrationRecord {
                    script_name: row[0].take().unwrap_or_default(),
                    checksum: row[1].take(),
                    text: row[2].take(),
                    applied_at,
                }
            })
            .collect();

        Ok(records)
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::{DuckDbConnection, DuckDbProvider, IN_MEMORY};
    use crate::ports::ConnectionProvider;

    fn setup() -> (HistoryStore, DuckDbConnection) {
        let mut conn = DuckDbProvider::new().open(IN_MEMORY).unwrap();
        let store = HistoryStore::new(DEFAULT_MIGRATION_TABLE).unwrap();
        store.ensure_table(&mut conn).unwrap();
        (store, conn)
    }

    #[test]
    fn test_table_name_validation() {
        assert!(HistoryStore::new("_Migration").is_ok());
        assert!(HistoryStore::new("schema_log2").is_ok());
        assert_eq!(HistoryStore::new("  _Migration ").unwrap().table(), "_Migration");
        for bad in ["", "2fast", "a-b", "x; DROP TABLE y", "\"quoted\"", "main.log"] {
            assert!(
                matches!(HistoryStore::new(bad), Err(Error::Configuration(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_record_then_has_applied() {
        let (store, mut conn) = setup();
        assert!(!store.has_applied(&mut conn, "001_init.sql").unwrap());

        let mut tx = conn.begin().unwrap();
        store
            .record(&mut tx, "001_init.sql", "ABC", "CREATE TABLE t (id INTEGER);")
            .unwrap();
        tx.commit().unwrap();

        assert!(store.has_applied(&mut conn, "001_init.sql").unwrap());
        assert!(!store.has_applied(&mut conn, "002_next.sql").unwrap());
    }

    #[test]
    fn test_rolled_back_record_is_not_applied() {
        let (store, mut conn) = setup();

        let mut tx = conn.begin().unwrap();
        store.record(&mut tx, "001_init.sql", "ABC", "select 1").unwrap();
        tx.rollback().unwrap();

        assert!(!store.has_applied(&mut conn, "001_init.sql").unwrap());
    }

    #[test]
    fn test_duplicate_records_are_a_storage_error() {
        let (store, mut conn) = setup();
        conn.execute_batch(
            "INSERT INTO _Migration (\"Script\") VALUES ('001_init.sql'), ('001_init.sql');",
        )
        .unwrap();

        let err = store.has_applied(&mut conn, "001_init.sql").err().unwrap();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_records_in_application_order() {
        let (store, mut conn) = setup();
        for (name, text) in [("002_b.sql", "select 2"), ("001_a.sql", "select 1")] {
            let mut tx = conn.begin().unwrap();
            store
                .record(&mut tx, name, &crate::compute_checksum(text), text)
                .unwrap();
            tx.commit().unwrap();
        }

        let records = store.records(&mut conn).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].script_name, "002_b.sql");
        assert_eq!(records[1].script_name, "001_a.sql");
        assert_eq!(records[1].text.as_deref(), Some("select 1"));
        assert_eq!(
            records[1].checksum.as_deref(),
            Some(crate::compute_checksum("select 1").as_str())
        );
        assert!(records.iter().all(|r| r.applied_at.is_some()));
    }

    #[test]
    fn test_records_without_table_is_empty() {
        let mut conn = DuckDbProvider::new().open(IN_MEMORY).unwrap();
        let store = HistoryStore::new("_Migration").unwrap();
        assert!(store.records(&mut conn).unwrap().is_empty());
        assert!(!store.exists(&mut conn).unwrap());
    }

    #[test]
    fn test_query_against_missing_table_is_storage_error() {
        let mut conn = DuckDbProvider::new().open(IN_MEMORY).unwrap();
        let store = HistoryStore::new("_Migration").unwrap();
        let err = store.has_applied(&mut conn, "001.sql").err().unwrap();
        assert!(matches!(err, Error::Storage(_)));
    }
}

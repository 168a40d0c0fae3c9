//! DuckDB connection adapter

use std::path::Path;
use std::thread;
use std::time::Duration;

use duckdb::params_from_iter;

use crate::domain::result::{Error, Result};
use crate::ports::{Connection, ConnectionProvider, Transaction};

/// Connection string that opens a throwaway in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("could not set lock on file")
        || lower.contains("database is locked")
}

/// Opens DuckDB connections
///
/// The connection string is a database file path, or `:memory:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbProvider;

impl DuckDbProvider {
    pub fn new() -> Self {
        Self
    }

    /// Attempt to open a database connection (called by open() with retry logic)
    fn try_open(connection_string: &str) -> duckdb::Result<duckdb::Connection> {
        // Disable extension autoloading so cached extensions never get pulled in
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        if connection_string == IN_MEMORY {
            duckdb::Connection::open_in_memory_with_flags(config)
        } else {
            duckdb::Connection::open_with_flags(Path::new(connection_string), config)
        }
    }
}

impl ConnectionProvider for DuckDbProvider {
    type Connection = DuckDbConnection;

    /// Includes retry logic with exponential backoff for file locking errors,
    /// which show up when another process still holds the database file.
    fn open(&self, connection_string: &str) -> Result<DuckDbConnection> {
        let connection_string = connection_string.trim();
        if connection_string.is_empty() {
            return Err(Error::connection("connection string is empty"));
        }

        let mut attempt = 0;
        loop {
            match Self::try_open(connection_string) {
                Ok(conn) => return Ok(DuckDbConnection { conn }),
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            "Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        attempt += 1;
                        continue;
                    }
                    return Err(Error::connection(format!(
                        "failed to open '{}': {}",
                        connection_string, err_msg
                    )));
                }
            }
        }
    }
}

/// An open DuckDB connection
pub struct DuckDbConnection {
    conn: duckdb::Connection,
}

impl DuckDbConnection {
    /// Wrap an already open connection
    pub fn from_connection(conn: duckdb::Connection) -> Self {
        Self { conn }
    }
}

impl Connection for DuckDbConnection {
    type Transaction<'c> = DuckDbTransaction<'c>;

    fn dialect(&self) -> &'static str {
        "duckdb"
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query_scalar(&mut self, sql: &str, params: &[&str]) -> Result<i64> {
        let value = self
            .conn
            .query_row(sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(value)
    }

    /// Every selected column must be VARCHAR; cast in SQL where needed.
    fn query_rows(&mut self, sql: &str, columns: usize) -> Result<Vec<Vec<Option<String>>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns);
            for i in 0..columns {
                values.push(row.get::<_, Option<String>>(i)?);
            }
            result.push(values);
        }
        Ok(result)
    }

    fn begin(&mut self) -> Result<DuckDbTransaction<'_>> {
        let tx = self.conn.transaction()?;
        Ok(DuckDbTransaction { tx })
    }

    fn ensure_history_table(&mut self, table: &str) -> Result<()> {
        // DuckDB has no identity columns; a per-table sequence feeds Id.
        // Tables written by older tools lack Checksum and Text.
        let ddl = format!(
            "CREATE SEQUENCE IF NOT EXISTS {table}_id_seq;
             CREATE TABLE IF NOT EXISTS {table} (
                 \"Id\"            BIGINT PRIMARY KEY DEFAULT nextval('{table}_id_seq'),
                 \"Script\"        VARCHAR(512),
                 \"ExecutionDate\" TIMESTAMP DEFAULT now(),
                 \"Checksum\"      VARCHAR,
                 \"Text\"          VARCHAR
             );
             ALTER TABLE {table} ADD COLUMN IF NOT EXISTS \"Checksum\" VARCHAR;
             ALTER TABLE {table} ADD COLUMN IF NOT EXISTS \"Text\" VARCHAR;"
        );
        self.conn.execute_batch(&ddl)?;
        Ok(())
    }

    fn history_table_exists(&mut self, table: &str) -> Result<bool> {
        let count = self.query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables WHERE lower(table_name) = lower(?)",
            &[table],
        )?;
        Ok(count > 0)
    }
}

/// A DuckDB transaction; rolls back on drop unless committed
pub struct DuckDbTransaction<'c> {
    tx: duckdb::Transaction<'c>,
}

impl Transaction for DuckDbTransaction<'_> {
    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.tx.execute_batch(sql)?;
        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize> {
        let affected = self.tx.execute(sql, params_from_iter(params.iter()))?;
        Ok(affected)
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

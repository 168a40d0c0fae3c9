//! Connection port - database driver abstraction
//!
//! The migration engine only needs to run batches, count rows, read back the
//! history table and wrap a script in a transaction. Everything dialect
//! specific (the history DDL above all) lives behind these traits.

use crate::domain::result::Result;

/// Opens connections from a connection string
pub trait ConnectionProvider {
    type Connection: Connection;

    /// Open a connection
    ///
    /// Fails with `Error::Connection` when the string is rejected or the
    /// database can't be reached.
    fn open(&self, connection_string: &str) -> Result<Self::Connection>;
}

/// An open database connection, owned by one engine run
///
/// Dropping the connection releases it.
pub trait Connection {
    type Transaction<'c>: Transaction
    where
        Self: 'c;

    /// Dialect identifier for logging
    fn dialect(&self) -> &'static str;

    /// Execute one or more SQL commands outside any explicit transaction
    fn execute_batch(&mut self, sql: &str) -> Result<()>;

    /// Run a query returning a single integer (e.g., COUNT(*))
    fn query_scalar(&mut self, sql: &str, params: &[&str]) -> Result<i64>;

    /// Run a query and return every row as `columns` text values
    fn query_rows(&mut self, sql: &str, columns: usize) -> Result<Vec<Vec<Option<String>>>>;

    /// Start a transaction; it rolls back when dropped without `commit`
    fn begin(&mut self) -> Result<Self::Transaction<'_>>;

    /// Create the history table if it doesn't already exist
    ///
    /// Columns: auto-increment `Id`, `Script`, `ExecutionDate` (defaults to
    /// the UTC time of insert), `Checksum`, `Text`.
    fn ensure_history_table(&mut self, table: &str) -> Result<()>;

    /// Whether the history table exists
    fn history_table_exists(&mut self, table: &str) -> Result<bool>;
}

/// A transaction borrowed from a `Connection`
pub trait Transaction {
    /// Execute one or more SQL commands inside the transaction
    fn execute_batch(&mut self, sql: &str) -> Result<()>;

    /// Execute a parameterized statement, returns affected rows
    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize>;

    fn commit(self) -> Result<()>;

    fn rollback(self) -> Result<()>;
}

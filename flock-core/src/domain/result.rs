//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// `Configuration` and `Connection` abort a run before any script is touched.
/// `Storage` covers the history table. `StatementExecution` is what a failed
/// script reports; the engine turns it into a rollback and a `Failed` outcome
/// instead of returning it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Statement execution failed: {0}")]
    StatementExecution(String),

    /// Raw driver failure, before the caller has classified it
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Message without the kind prefix, as reported next to a failed script
    pub fn detail(&self) -> String {
        match self {
            Self::Configuration(m)
            | Self::Connection(m)
            | Self::Storage(m)
            | Self::StatementExecution(m)
            | Self::Database(m) => m.clone(),
            Self::Io(e) => e.to_string(),
            Self::Json(e) => e.to_string(),
        }
    }

    /// Re-tag a driver error as a storage error, keeping other kinds as they are
    pub(crate) fn into_storage(self, context: &str) -> Self {
        match self {
            Self::Database(m) => Self::Storage(format!("{}: {}", context, m)),
            other => other,
        }
    }

    /// Re-tag a driver error as a statement failure
    pub(crate) fn into_statement(self) -> Self {
        match self {
            Self::Database(m) => Self::StatementExecution(m),
            other => other,
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

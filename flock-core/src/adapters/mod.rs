//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the Connection/ConnectionProvider ports

pub mod duckdb;

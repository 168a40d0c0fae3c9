//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The migration
//! engine depends only on these traits, not on a concrete database.

mod connection;

pub use connection::{Connection, ConnectionProvider, Transaction};

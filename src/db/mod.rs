//! Database module
//!
//! SQLite storage for the profile and meal log.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};

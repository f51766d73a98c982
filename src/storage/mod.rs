//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with one table:
//! - records(id, company, role, status, date_applied, attachment)

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;

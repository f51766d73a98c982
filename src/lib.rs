//! # Jobtrack - Job Application Tracker
//!
//! Tracks job applications (company, role, status, applied date) with an
//! optional résumé attachment, served over a small REST API.
//!
//! Jobtrack provides:
//! - A SQLite-backed record store with native binary attachments
//! - The application record service (validation, status vocabulary, summaries)
//! - An axum HTTP surface consumed by the browser client

pub mod record;
pub mod storage;
pub mod service;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use record::{ApplicationStatus, NewRecord, RecordPatch, RecordSummary};
pub use service::{Attachment, RecordService};
pub use storage::SqliteStore;

/// Result type alias for Jobtrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Jobtrack operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Transcode error: {0}")]
    Transcode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

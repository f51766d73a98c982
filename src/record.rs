//! Record types - the application record and its projections
//!
//! - `ApplicationStatus`: closed status vocabulary
//! - `NewRecord`: validated fields for an insert
//! - `RecordPatch`: optional fields for a partial update
//! - `RecordSummary`: JSON projection returned to clients

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Date format used for `dateApplied` in storage and on the wire
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where an application currently stands.
///
/// There are no transition rules: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    /// Get the string representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Get all statuses
    pub fn all() -> &'static [ApplicationStatus] {
        &[
            ApplicationStatus::Applied,
            ApplicationStatus::Interview,
            ApplicationStatus::Offer,
            ApplicationStatus::Rejected,
        ]
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(ApplicationStatus::Applied),
            "interview" => Ok(ApplicationStatus::Interview),
            "offer" => Ok(ApplicationStatus::Offer),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(Error::Validation(format!(
                "Unknown status '{}' (expected one of: Applied, Interview, Offer, Rejected)",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check that a required text field is present and non-blank
pub fn require_text(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(Error::Validation(format!("Field '{}' must not be empty", field))),
        None => Err(Error::Validation(format!("Field '{}' is required", field))),
    }
}

/// Parse a strict ISO `YYYY-MM-DD` date string.
///
/// Month and day must be zero-padded; `2024-1-5` is rejected rather than
/// rewritten.
pub fn parse_date(value: &str) -> Result<String> {
    let trimmed = value.trim();
    let invalid = || {
        Error::Validation(format!(
            "Field 'dateApplied' must be a YYYY-MM-DD date, got '{}'",
            value
        ))
    };
    let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| invalid())?;
    let formatted = date.format(DATE_FORMAT).to_string();
    if formatted != trimmed {
        return Err(invalid());
    }
    Ok(formatted)
}

/// A validated record ready for insertion (id assigned by the store)
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub company: String,
    pub role: String,
    pub status: ApplicationStatus,
    pub date_applied: String,
    pub attachment: Option<Vec<u8>>,
}

/// Fields to overwrite on an existing record. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub date_applied: Option<String>,
    pub attachment: Option<Vec<u8>>,
}

impl RecordPatch {
    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.role.is_none()
            && self.status.is_none()
            && self.date_applied.is_none()
            && self.attachment.is_none()
    }
}

/// A persisted record as read back from the store.
///
/// Never carries the attachment payload, only whether one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub status: ApplicationStatus,
    pub date_applied: String,
    pub has_attachment: bool,
}

/// The client-facing projection of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub status: ApplicationStatus,
    pub date_applied: String,
    /// Derived reference to the attachment, present only when one is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

/// Path under which a record's attachment is served
pub fn attachment_reference(id: i64) -> String {
    format!("/records/{}/attachment", id)
}

impl From<StoredRecord> for RecordSummary {
    fn from(record: StoredRecord) -> Self {
        let attachment = record.has_attachment.then(|| attachment_reference(record.id));
        Self {
            id: record.id,
            company: record.company,
            role: record.role,
            status: record.status,
            date_applied: record.date_applied,
            attachment,
        }
    }
}

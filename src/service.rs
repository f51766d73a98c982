//! Application record service
//!
//! Owns validation, the status vocabulary, and the mapping from stored rows
//! to client-facing summaries. Attachment bytes only ever leave through
//! [`RecordService::attachment`].

use std::sync::{Arc, Mutex};

use crate::record::{self, ApplicationStatus, NewRecord, RecordPatch, RecordSummary};
use crate::storage::SqliteStore;
use crate::{Error, Result};

/// Media type attachments are served with
pub const ATTACHMENT_CONTENT_TYPE: &str = "application/pdf";

/// Raw, unvalidated record fields as submitted by a client.
///
/// Every field is optional here; `create` and `update` decide what is required.
#[derive(Debug, Clone, Default)]
pub struct RecordForm {
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub date_applied: Option<String>,
    pub attachment: Option<Vec<u8>>,
}

/// A decoded attachment ready to be sent back to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Service over the process-wide record store
#[derive(Clone)]
pub struct RecordService {
    store: Arc<Mutex<SqliteStore>>,
}

impl RecordService {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a store operation on the blocking pool so attachment I/O never
    /// stalls an async worker.
    async fn with_store<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&SqliteStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let guard = store
                .lock()
                .map_err(|_| Error::Internal("record store lock poisoned".to_string()))?;
            op(&*guard)
        })
        .await
        .map_err(|e| Error::Internal(format!("store task failed: {}", e)))?
    }

    /// Create a record; all four text fields are required
    pub async fn create(&self, form: RecordForm) -> Result<RecordSummary> {
        let new_record = NewRecord {
            company: record::require_text("company", form.company)?,
            role: record::require_text("role", form.role)?,
            status: record::require_text("status", form.status)?.parse()?,
            date_applied: record::parse_date(&record::require_text("dateApplied", form.date_applied)?)?,
            attachment: non_empty(form.attachment),
        };

        let stored = self.with_store(move |store| store.insert(&new_record)).await?;
        tracing::info!(id = stored.id, company = %stored.company, has_attachment = stored.has_attachment, "Created record");
        Ok(stored.into())
    }

    /// All records, most recent first
    pub async fn list(&self) -> Result<Vec<RecordSummary>> {
        let records = self.with_store(|store| store.list_all()).await?;
        Ok(records.into_iter().map(RecordSummary::from).collect())
    }

    /// A single record by id
    pub async fn get(&self, id: i64) -> Result<RecordSummary> {
        Ok(self.with_store(move |store| store.get(id)).await?.into())
    }

    /// Overwrite the supplied fields of a record.
    ///
    /// Omitted fields keep their stored value; a supplied field must still be
    /// valid. The returned summary reflects the attachment currently stored,
    /// whether or not this call replaced it.
    pub async fn update(&self, id: i64, form: RecordForm) -> Result<RecordSummary> {
        let patch = RecordPatch {
            company: optional_text("company", form.company)?,
            role: optional_text("role", form.role)?,
            status: optional_text("status", form.status)?
                .map(|s| s.parse::<ApplicationStatus>())
                .transpose()?,
            date_applied: optional_text("dateApplied", form.date_applied)?
                .map(|d| record::parse_date(&d))
                .transpose()?,
            attachment: non_empty(form.attachment),
        };

        if patch.is_empty() {
            tracing::debug!(id, "Update supplied no fields");
            return self.get(id).await;
        }

        let replaced_attachment = patch.attachment.is_some();
        let stored = self.with_store(move |store| store.update(id, &patch)).await?;
        tracing::info!(id, replaced_attachment, "Updated record");
        Ok(stored.into())
    }

    /// Remove a record and its attachment
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.with_store(move |store| store.delete(id)).await?;
        tracing::info!(id, "Deleted record");
        Ok(())
    }

    /// Fetch the attachment of a record.
    ///
    /// Fails with `NotFound` both when the record is missing and when it has
    /// no attachment.
    pub async fn attachment(&self, id: i64) -> Result<Attachment> {
        let bytes = self
            .with_store(move |store| store.get_attachment(id))
            .await?
            .ok_or(Error::NotFound(id))?;

        Ok(Attachment {
            bytes,
            content_type: ATTACHMENT_CONTENT_TYPE,
            file_name: format!("resume-{}.pdf", id),
        })
    }

    /// Number of stored records
    pub async fn count(&self) -> Result<usize> {
        self.with_store(|store| store.count()).await
    }
}

/// A supplied field must be non-blank; an absent one stays absent
fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>> {
    value.map(|v| record::require_text(field, Some(v))).transpose()
}

/// Browsers submit an empty file part when no file was chosen
fn non_empty(attachment: Option<Vec<u8>>) -> Option<Vec<u8>> {
    attachment.filter(|bytes| !bytes.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> RecordService {
        RecordService::new(SqliteStore::open_in_memory().unwrap())
    }

    fn acme_form() -> RecordForm {
        RecordForm {
            company: Some("Acme".into()),
            role: Some("Engineer".into()),
            status: Some("Applied".into()),
            date_applied: Some("2024-01-15".into()),
            attachment: None,
        }
    }

    #[tokio::test]
    async fn test_create_without_attachment() {
        let service = service();
        let summary = service.create(acme_form()).await.unwrap();

        assert_eq!(summary.id, 1);
        assert_eq!(summary.company, "Acme");
        assert_eq!(summary.status, ApplicationStatus::Applied);
        assert!(summary.attachment.is_none());
    }

    #[tokio::test]
    async fn test_create_requires_every_field() {
        let service = service();

        for strip in 0..4 {
            let mut form = acme_form();
            match strip {
                0 => form.company = None,
                1 => form.role = Some("  ".into()),
                2 => form.status = None,
                _ => form.date_applied = Some(String::new()),
            }
            let err = service.create(form).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "case {strip}: {err}");
        }
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_status_and_date() {
        let service = service();

        let form = RecordForm { status: Some("Hired".into()), ..acme_form() };
        assert!(matches!(service.create(form).await, Err(Error::Validation(_))));

        let form = RecordForm { date_applied: Some("Jan 15".into()), ..acme_form() };
        assert!(matches!(service.create(form).await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_attachment_roundtrip() {
        let service = service();
        let payload = b"%PDF-1.7\n\x00\xff binary".to_vec();

        let form = RecordForm { attachment: Some(payload.clone()), ..acme_form() };
        let summary = service.create(form).await.unwrap();
        assert_eq!(summary.attachment.as_deref(), Some("/records/1/attachment"));

        let attachment = service.attachment(summary.id).await.unwrap();
        assert_eq!(attachment.bytes, payload);
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(attachment.file_name, "resume-1.pdf");
    }

    #[tokio::test]
    async fn test_empty_upload_is_no_attachment() {
        let service = service();
        let form = RecordForm { attachment: Some(Vec::new()), ..acme_form() };
        let summary = service.create(form).await.unwrap();

        assert!(summary.attachment.is_none());
        assert!(matches!(service.attachment(summary.id).await, Err(Error::NotFound(1))));
    }

    #[tokio::test]
    async fn test_status_only_update_reports_existing_attachment() {
        let service = service();
        let form = RecordForm { attachment: Some(b"resume".to_vec()), ..acme_form() };
        let created = service.create(form).await.unwrap();

        let patch = RecordForm { status: Some("Interview".into()), ..Default::default() };
        let updated = service.update(created.id, patch).await.unwrap();

        assert_eq!(updated.status, ApplicationStatus::Interview);
        assert_eq!(updated.company, created.company);
        assert_eq!(updated.role, created.role);
        assert_eq!(updated.date_applied, created.date_applied);
        assert_eq!(updated.attachment, created.attachment);
        assert_eq!(service.attachment(created.id).await.unwrap().bytes, b"resume");
    }

    #[tokio::test]
    async fn test_update_rejects_blank_supplied_field() {
        let service = service();
        let created = service.create(acme_form()).await.unwrap();

        let patch = RecordForm { company: Some(String::new()), ..Default::default() };
        assert!(matches!(service.update(created.id, patch).await, Err(Error::Validation(_))));
        assert_eq!(service.get(created.id).await.unwrap().company, "Acme");
    }

    #[tokio::test]
    async fn test_update_rejects_bad_status_and_date() {
        let service = service();
        let created = service.create(acme_form()).await.unwrap();

        let patch = RecordForm { status: Some("Hired".into()), ..Default::default() };
        assert!(matches!(service.update(created.id, patch).await, Err(Error::Validation(_))));

        let patch = RecordForm { date_applied: Some("2024-13-01".into()), ..Default::default() };
        assert!(matches!(service.update(created.id, patch).await, Err(Error::Validation(_))));

        let unchanged = service.get(created.id).await.unwrap();
        assert_eq!(unchanged.status, ApplicationStatus::Applied);
        assert_eq!(unchanged.date_applied, "2024-01-15");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let service = service();
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.create(acme_form()).await })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().unwrap().id);
        }
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_deleted_record_is_gone() {
        let service = service();
        let created = service.create(acme_form()).await.unwrap();
        service.delete(created.id).await.unwrap();

        assert!(matches!(service.get(created.id).await, Err(Error::NotFound(_))));
        assert!(matches!(service.update(created.id, RecordForm::default()).await, Err(Error::NotFound(_))));
        assert!(matches!(service.delete(created.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_after_delete() {
        let service = service();
        for _ in 0..4 {
            service.create(acme_form()).await.unwrap();
        }
        service.delete(2).await.unwrap();

        let ids: Vec<i64> = service.list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 3, 1]);
    }
}

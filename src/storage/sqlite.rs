//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use crate::{Result, Error};
use crate::record::{ApplicationStatus, NewRecord, RecordPatch, StoredRecord};
use super::schema;

/// Columns selected for every record read; the payload itself stays in the table.
const RECORD_COLUMNS: &str =
    "id, company, role, status, date_applied, attachment IS NOT NULL";

/// SQLite-backed storage for application records
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Insert a record and return it with its assigned id
    pub fn insert(&self, record: &NewRecord) -> Result<StoredRecord> {
        let sql = format!(
            "INSERT INTO records (company, role, status, date_applied, attachment)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {}",
            RECORD_COLUMNS
        );
        let stored = self.conn.query_row(
            &sql,
            params![
                record.company,
                record.role,
                record.status.as_str(),
                record.date_applied,
                record.attachment,
            ],
            row_to_record,
        )?;
        Ok(stored)
    }

    /// All records, most recent first
    pub fn list_all(&self) -> Result<Vec<StoredRecord>> {
        let sql = format!("SELECT {} FROM records ORDER BY id DESC", RECORD_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;

        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Get a record by id
    pub fn get(&self, id: i64) -> Result<StoredRecord> {
        let sql = format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS);
        self.conn
            .query_row(&sql, [id], row_to_record)
            .optional()?
            .ok_or(Error::NotFound(id))
    }

    /// Get the attachment payload of a record, if it has one
    pub fn get_attachment(&self, id: i64) -> Result<Option<Vec<u8>>> {
        let row: Option<Option<Vec<u8>>> = self.conn
            .query_row(
                "SELECT attachment FROM records WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        row.ok_or(Error::NotFound(id))
    }

    /// Overwrite the supplied fields of a record in a single statement
    pub fn update(&self, id: i64, patch: &RecordPatch) -> Result<StoredRecord> {
        let sql = format!(
            "UPDATE records SET
                company = COALESCE(?1, company),
                role = COALESCE(?2, role),
                status = COALESCE(?3, status),
                date_applied = COALESCE(?4, date_applied),
                attachment = COALESCE(?5, attachment)
             WHERE id = ?6
             RETURNING {}",
            RECORD_COLUMNS
        );
        self.conn
            .query_row(
                &sql,
                params![
                    patch.company,
                    patch.role,
                    patch.status.map(|s| s.as_str()),
                    patch.date_applied,
                    patch.attachment,
                    id,
                ],
                row_to_record,
            )
            .optional()?
            .ok_or(Error::NotFound(id))
    }

    /// Delete a record and its attachment
    pub fn delete(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM records WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(Error::NotFound(id));
        }
        Ok(())
    }

    /// Count all records
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Helper to convert a row to a StoredRecord
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<StoredRecord> {
    let status_str: String = row.get(3)?;
    let status: ApplicationStatus = status_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(StoredRecord {
        id: row.get(0)?,
        company: row.get(1)?,
        role: row.get(2)?,
        status,
        date_applied: row.get(4)?,
        has_attachment: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(company: &str, attachment: Option<&[u8]>) -> NewRecord {
        NewRecord {
            company: company.to_string(),
            role: "Engineer".to_string(),
            status: ApplicationStatus::Applied,
            date_applied: "2024-01-15".to_string(),
            attachment: attachment.map(<[u8]>::to_vec),
        }
    }

    #[test]
    fn test_record_crud() {
        let store = SqliteStore::open_in_memory().unwrap();

        let inserted = store.insert(&sample_record("Acme", None)).unwrap();
        assert_eq!(inserted.id, 1);
        assert!(!inserted.has_attachment);

        let retrieved = store.get(inserted.id).unwrap();
        assert_eq!(retrieved, inserted);

        store.delete(inserted.id).unwrap();
        assert!(matches!(store.get(inserted.id), Err(Error::NotFound(1))));
        assert!(matches!(store.delete(inserted.id), Err(Error::NotFound(1))));
    }

    #[test]
    fn test_list_orders_by_id_descending() {
        let store = SqliteStore::open_in_memory().unwrap();

        for company in ["Acme", "Globex", "Initech"] {
            store.insert(&sample_record(company, None)).unwrap();
        }

        let ids: Vec<i64> = store.list_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_attachment_roundtrip_is_binary_safe() {
        let store = SqliteStore::open_in_memory().unwrap();
        let payload: Vec<u8> = (0..=255u8).chain([0, 0, 255]).collect();

        let inserted = store.insert(&sample_record("Acme", Some(payload.as_slice()))).unwrap();
        assert!(inserted.has_attachment);

        let fetched = store.get_attachment(inserted.id).unwrap().unwrap();
        assert_eq!(fetched, payload);
    }

    #[test]
    fn test_get_attachment_distinguishes_missing_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let inserted = store.insert(&sample_record("Acme", None)).unwrap();

        assert_eq!(store.get_attachment(inserted.id).unwrap(), None);
        assert!(matches!(store.get_attachment(42), Err(Error::NotFound(42))));
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let store = SqliteStore::open_in_memory().unwrap();
        let inserted = store.insert(&sample_record("Acme", Some(&b"%PDF-old"[..]))).unwrap();

        let patch = RecordPatch {
            status: Some(ApplicationStatus::Interview),
            ..Default::default()
        };
        let updated = store.update(inserted.id, &patch).unwrap();

        assert_eq!(updated.status, ApplicationStatus::Interview);
        assert_eq!(updated.company, "Acme");
        assert_eq!(updated.role, "Engineer");
        assert_eq!(updated.date_applied, "2024-01-15");
        assert!(updated.has_attachment);
        assert_eq!(store.get_attachment(inserted.id).unwrap().unwrap(), b"%PDF-old");
    }

    #[test]
    fn test_update_replaces_attachment() {
        let store = SqliteStore::open_in_memory().unwrap();
        let inserted = store.insert(&sample_record("Acme", Some(&b"old"[..]))).unwrap();

        let patch = RecordPatch {
            attachment: Some(b"new".to_vec()),
            ..Default::default()
        };
        store.update(inserted.id, &patch).unwrap();

        assert_eq!(store.get_attachment(inserted.id).unwrap().unwrap(), b"new");
    }

    #[test]
    fn test_update_missing_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let patch = RecordPatch {
            company: Some("Acme".into()),
            ..Default::default()
        };
        assert!(matches!(store.update(9, &patch), Err(Error::NotFound(9))));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = store.insert(&sample_record("Acme", None)).unwrap();
        let second = store.insert(&sample_record("Globex", None)).unwrap();
        store.delete(second.id).unwrap();

        let third = store.insert(&sample_record("Initech", None)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(third.id, 3);
    }

    #[test]
    fn test_open_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(&sample_record("Acme", None)).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}

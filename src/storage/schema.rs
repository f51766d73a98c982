//! Database schema definitions

/// SQL to create the records table.
///
/// `AUTOINCREMENT` keeps ids from being reused after a delete.
pub const CREATE_RECORDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company TEXT NOT NULL,
    role TEXT NOT NULL,
    status TEXT NOT NULL,
    date_applied TEXT NOT NULL,
    attachment BLOB
)
"#;

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_RECORDS_TABLE]
}

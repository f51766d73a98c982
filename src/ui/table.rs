use tabled::{settings::Style, Table, Tabled};
use crate::record::RecordSummary;
use crate::ui::{status_label, Icons};

#[derive(Tabled)]
pub struct RecordRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Company")]
    pub company: String,
    #[tabled(rename = "Role")]
    pub role: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Applied")]
    pub date_applied: String,
    #[tabled(rename = "Résumé")]
    pub attachment: String,
}

impl From<&RecordSummary> for RecordRow {
    fn from(summary: &RecordSummary) -> Self {
        Self {
            id: summary.id,
            company: summary.company.clone(),
            role: summary.role.clone(),
            status: status_label(summary.status),
            date_applied: summary.date_applied.clone(),
            attachment: if summary.attachment.is_some() {
                Icons::FILE.to_string()
            } else {
                String::new()
            },
        }
    }
}

pub fn records_table(records: &[RecordSummary]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ApplicationStatus;

    #[test]
    fn test_records_table_lists_every_record() {
        let records = vec![
            RecordSummary {
                id: 2,
                company: "Globex".into(),
                role: "Analyst".into(),
                status: ApplicationStatus::Offer,
                date_applied: "2024-02-01".into(),
                attachment: Some("/records/2/attachment".into()),
            },
            RecordSummary {
                id: 1,
                company: "Acme".into(),
                role: "Engineer".into(),
                status: ApplicationStatus::Applied,
                date_applied: "2024-01-15".into(),
                attachment: None,
            },
        ];

        let table = records_table(&records);
        assert!(table.contains("Globex"));
        assert!(table.contains("Acme"));
        assert!(table.contains("2024-01-15"));
        assert!(records_table(&[]).is_empty());
    }
}

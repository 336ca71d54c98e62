//! Record import
//!
//! JSON payloads come in two shapes:
//!
//! ```text
//! [ {..}, {..} ]                       one table, named by the caller
//! { "tags": [..], "ori_qs": [..] }     several tables, keyed by name
//! ```
//!
//! Every table is inserted in its own transaction. A table that fails rolls
//! back alone and never aborts the rest of the batch.

mod csv_input;
mod importer;

use qaeval_core::ValidationError;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::DbError;

pub use csv_input::read_csv;
pub use importer::{is_account_table, Importer, ACCOUNT_TABLES, IMPORT_ORDER, KEY_TABLES};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Imported,
    Skipped,
    Failed,
}

/// Result for one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableOutcome {
    pub status: ImportStatus,
    pub inserted_count: u64,
    pub message: String,
}

impl TableOutcome {
    pub fn imported(count: u64) -> Self {
        Self {
            status: ImportStatus::Imported,
            inserted_count: count,
            message: format!("successfully imported {count} records"),
        }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Skipped,
            inserted_count: 0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Failed,
            inserted_count: 0,
            message: message.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ImportStatus::Failed
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: String,
    #[serde(flatten)]
    pub outcome: TableOutcome,
}

/// Result of a multi-table import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// No table failed
    pub success: bool,
    pub total_imported: u64,
    pub tables: Vec<TableReport>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn push(&mut self, table: impl Into<String>, outcome: TableOutcome) {
        self.total_imported += outcome.inserted_count;
        self.tables.push(TableReport {
            table: table.into(),
            outcome,
        });
    }

    pub fn outcome(&self, table: &str) -> Option<&TableOutcome> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| &t.outcome)
    }

    fn finish(mut self) -> Self {
        self.success = !self.tables.iter().any(|t| t.outcome.is_failed());
        self
    }
}

/// Shape of a JSON import document
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    SingleTable(Vec<Value>),
    MultiTable(Map<String, Value>),
}

impl Payload {
    pub fn detect(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Array(records) => Ok(Self::SingleTable(records)),
            Value::Object(tables) => Ok(Self::MultiTable(tables)),
            _ => Err(ValidationError::InvalidFormat {
                field: "payload",
                reason: "expected a JSON array of records or an object of table arrays",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn imported_message() {
        let outcome = TableOutcome::imported(2);
        assert_eq!(outcome.message, "successfully imported 2 records");
        assert_eq!(outcome.inserted_count, 2);
    }

    #[test]
    fn detects_payload_shape() {
        assert!(matches!(
            Payload::detect(json!([{"name": "sql"}])),
            Ok(Payload::SingleTable(r)) if r.len() == 1
        ));
        assert!(matches!(
            Payload::detect(json!({"tags": []})),
            Ok(Payload::MultiTable(_))
        ));
        assert!(Payload::detect(json!("tags")).is_err());
    }

    #[test]
    fn report_totals_and_success() {
        let mut report = ImportReport::default();
        report.push("tags", TableOutcome::imported(2));
        report.push("ori_qs", TableOutcome::imported(3));
        report.push("nope", TableOutcome::skipped("table 'nope' does not exist"));
        let report = report.finish();
        assert!(report.success);
        assert_eq!(report.total_imported, 5);

        let mut failing = ImportReport::default();
        failing.push("User", TableOutcome::failed("boom"));
        assert!(!failing.finish().success);
    }

    #[test]
    fn table_report_flattens_outcome() {
        let mut report = ImportReport::default();
        report.push("tags", TableOutcome::imported(1));
        let json = serde_json::to_value(&report.tables[0]).unwrap();
        assert_eq!(json["table"], "tags");
        assert_eq!(json["status"], "imported");
        assert_eq!(json["inserted_count"], 1);
    }
}

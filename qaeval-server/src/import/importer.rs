use serde_json::{Map, Value};
use sqlx::MySqlPool;
use tracing::{error, info, warn};

use super::{ImportError, ImportReport, TableOutcome};
use crate::db::builder::InsertStatement;
use crate::db::introspect::{SchemaCatalog, TableInfo};
use crate::db::value::SqlValue;
use crate::db::DbError;

/// Parents before children, so foreign keys resolve during an ordered import.
pub const IMPORT_ORDER: &[&str] = &[
    "ori_qs",
    "tags",
    "ori_ans",
    "llm_type",
    "User",
    "updated_content",
    "standard_ans",
    "standard_QS",
    "llm_evaluation",
    "standard_pair",
];

/// Tables whose failure leaves most of an ordered import dangling
pub const KEY_TABLES: &[&str] = &["User", "llm_type", "ori_qs", "tags"];

/// Tables holding accounts and credentials
pub const ACCOUNT_TABLES: &[&str] = &["User", "user_login_history"];

/// True when `name` resolves to one of [`ACCOUNT_TABLES`].
pub fn is_account_table(name: &str) -> bool {
    ACCOUNT_TABLES.iter().any(|t| t.eq_ignore_ascii_case(name))
}

/// Rows ready to insert into one table
#[derive(Debug)]
pub(crate) struct Prepared {
    pub statement: InsertStatement,
    pub rows: Vec<Vec<SqlValue>>,
}

/// Turn a JSON value into insertable rows for `table`.
///
/// Columns are the first record's keys that exist on the table. Non-object
/// records are dropped; missing keys bind NULL.
pub(crate) fn prepare_json(table: &TableInfo, value: &Value) -> Result<Prepared, TableOutcome> {
    let name = table.name();
    let Some(records) = value.as_array() else {
        return Err(TableOutcome::skipped(format!("value for table '{name}' is not a list")));
    };
    let objects: Vec<&Map<String, Value>> = records.iter().filter_map(Value::as_object).collect();
    let Some(first) = objects.first() else {
        return Err(TableOutcome::skipped(format!("no records for table '{name}'")));
    };

    let columns: Vec<&str> = first
        .keys()
        .map(String::as_str)
        .filter(|key| table.column(key).is_some())
        .collect();
    if columns.is_empty() {
        return Err(TableOutcome::failed(format!(
            "no matching columns for table '{name}'"
        )));
    }

    let rows = objects
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|col| record.get(*col).map(SqlValue::from_json).unwrap_or(SqlValue::Null))
                .collect()
        })
        .collect();

    let statement = InsertStatement::new(table, columns.iter().copied())
        .map_err(|e| TableOutcome::failed(e.to_string()))?;
    Ok(Prepared { statement, rows })
}

pub struct Importer<'a> {
    pool: &'a MySqlPool,
}

impl<'a> Importer<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Import every table in `tables`, in payload order.
    pub async fn import_batch(&self, tables: &Map<String, Value>) -> Result<ImportReport, ImportError> {
        let catalog = SchemaCatalog::load(self.pool).await?;
        let mut report = ImportReport::default();
        for (name, value) in tables {
            let outcome = self.import_value(&catalog, name, value).await;
            report.push(name.clone(), outcome);
        }
        Ok(report.finish())
    }

    /// Import a flat list of records into one table.
    pub async fn import_table(&self, table: &str, records: &[Value]) -> Result<TableOutcome, ImportError> {
        let catalog = SchemaCatalog::load(self.pool).await?;
        let value = Value::Array(records.to_vec());
        Ok(self.import_value(&catalog, table, &value).await)
    }

    /// Import the tables of [`IMPORT_ORDER`] that appear in `tables`.
    ///
    /// Payload keys match the order list case-insensitively. Listed tables
    /// missing from the payload and payload tables outside the list become
    /// warnings.
    pub async fn import_ordered(&self, tables: &Map<String, Value>) -> Result<ImportReport, ImportError> {
        let catalog = SchemaCatalog::load(self.pool).await?;
        let mut report = ImportReport::default();

        for (step, &ordered) in IMPORT_ORDER.iter().enumerate() {
            let Some((key, value)) = tables
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(ordered))
            else {
                warn!(table = ordered, "table not in payload");
                report.warnings.push(format!("table '{ordered}' not in payload"));
                continue;
            };

            info!(step = step + 1, of = IMPORT_ORDER.len(), table = ordered, "importing");
            let outcome = self.import_value(&catalog, ordered, value).await;
            if outcome.is_failed() && KEY_TABLES.contains(&ordered) {
                error!(table = ordered, payload_key = %key, message = %outcome.message, "key table failed");
                report
                    .warnings
                    .push(format!("key table '{ordered}' failed: {}", outcome.message));
            }
            report.push(ordered, outcome);
        }

        for key in tables.keys() {
            if !IMPORT_ORDER.iter().any(|t| t.eq_ignore_ascii_case(key)) {
                report
                    .warnings
                    .push(format!("table '{key}' is not in the import order and was ignored"));
            }
        }

        let report = report.finish();
        info!(
            total_imported = report.total_imported,
            warnings = report.warnings.len(),
            "ordered import finished"
        );
        Ok(report)
    }

    /// Import CSV text into `table`.
    pub async fn import_csv(
        &self,
        table: &str,
        input: &[u8],
        has_header: bool,
    ) -> Result<TableOutcome, ImportError> {
        let catalog = SchemaCatalog::load(self.pool).await?;
        let Some(info) = catalog.resolve(table) else {
            return Ok(TableOutcome::skipped(format!("table '{table}' does not exist")));
        };
        let (columns, rows) = super::read_csv(input, has_header, info)?;
        if columns.is_empty() {
            return Ok(TableOutcome::failed(format!(
                "no matching columns for table '{}'",
                info.name()
            )));
        }
        if rows.is_empty() {
            return Ok(TableOutcome::skipped(format!("no records for table '{}'", info.name())));
        }
        let statement = InsertStatement::new(info, columns.iter().map(String::as_str))?;
        Ok(self.finish_table(info.name(), statement, rows).await)
    }

    async fn import_value(&self, catalog: &SchemaCatalog, name: &str, value: &Value) -> TableOutcome {
        let Some(table) = catalog.resolve(name) else {
            warn!(table = name, "import target does not exist");
            return TableOutcome::skipped(format!("table '{name}' does not exist"));
        };
        match prepare_json(table, value) {
            Ok(prepared) => self.finish_table(table.name(), prepared.statement, prepared.rows).await,
            Err(outcome) => outcome,
        }
    }

    async fn finish_table(&self, name: &str, statement: InsertStatement, rows: Vec<Vec<SqlValue>>) -> TableOutcome {
        match self.insert_rows(&statement, rows).await {
            Ok(count) => {
                info!(table = name, count, "table imported");
                TableOutcome::imported(count)
            }
            Err(e) => {
                warn!(table = name, error = %e, "table import rolled back");
                TableOutcome::failed(format!("import into '{name}' failed: {e}"))
            }
        }
    }

    /// All rows in one transaction, chunked below the placeholder limit.
    async fn insert_rows(&self, statement: &InsertStatement, rows: Vec<Vec<SqlValue>>) -> Result<u64, DbError> {
        let chunk = statement.max_rows_per_statement();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let batch: Vec<_> = rows.by_ref().take(chunk).collect();
            let mut builder = statement.build(batch);
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::introspect::tests::{sample_catalog, table};
    use crate::import::ImportStatus;
    use serde_json::json;

    #[test]
    fn order_starts_with_parents() {
        let pos = |t: &str| IMPORT_ORDER.iter().position(|x| *x == t).unwrap();
        assert!(pos("ori_qs") < pos("ori_ans"));
        assert!(pos("updated_content") < pos("standard_ans"));
        assert!(pos("llm_evaluation") < pos("standard_pair"));
        assert_eq!(IMPORT_ORDER.len(), 10);
    }

    #[test]
    fn account_tables_match_like_resolution() {
        assert!(is_account_table("User"));
        assert!(is_account_table("user"));
        assert!(is_account_table("USER_LOGIN_HISTORY"));
        assert!(!is_account_table("tags"));
        assert!(!is_account_table("users"));
    }

    #[test]
    fn prepares_intersection_of_first_record_keys() {
        let catalog = sample_catalog();
        let tags = catalog.resolve("tags").unwrap();
        let prepared = prepare_json(
            tags,
            &json!([{"name": "sql", "color": "red"}, {"name": "db"}, "not a record"]),
        )
        .unwrap();
        assert_eq!(prepared.statement.columns().len(), 1);
        assert_eq!(prepared.statement.columns()[0].as_str(), "name");
        assert_eq!(
            prepared.rows,
            vec![vec![SqlValue::Text("sql".into())], vec![SqlValue::Text("db".into())]]
        );
    }

    #[test]
    fn missing_keys_bind_null() {
        let ori_qs = table("ori_qs", &["ori_qs_id", "content", "source"]);
        let prepared = prepare_json(
            &ori_qs,
            &json!([{"content": "q1", "source": "web"}, {"content": "q2"}]),
        )
        .unwrap();
        assert_eq!(prepared.rows[1], vec![SqlValue::Text("q2".into()), SqlValue::Null]);
    }

    #[test]
    fn empty_or_non_list_is_skipped() {
        let tags = table("tags", &["tag_id", "name"]);
        let empty = prepare_json(&tags, &json!([])).unwrap_err();
        assert_eq!(empty.status, ImportStatus::Skipped);
        let scalar = prepare_json(&tags, &json!({"name": "sql"})).unwrap_err();
        assert_eq!(scalar.status, ImportStatus::Skipped);
    }

    #[test]
    fn no_shared_columns_fails() {
        let tags = table("tags", &["tag_id", "name"]);
        let outcome = prepare_json(&tags, &json!([{"label": "sql"}])).unwrap_err();
        assert!(outcome.is_failed());
        assert_eq!(outcome.inserted_count, 0);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn imports_tags_batch() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::schema::create_tables(&pool).await;

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let payload = json!({
            "tags": [{"name": format!("sql-{}", &suffix[..8])}, {"name": format!("db-{}", &suffix[..8])}]
        });
        let report = Importer::new(&pool)
            .import_batch(payload.as_object().unwrap())
            .await
            .unwrap();
        let outcome = report.outcome("tags").unwrap();
        assert_eq!(outcome.inserted_count, 2);
        assert_eq!(outcome.message, "successfully imported 2 records");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_in_batch_rolls_back_table() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::schema::create_tables(&pool).await;

        let name = format!("dup-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        let outcome = Importer::new(&pool)
            .import_table("tags", &[json!({"name": name}), json!({"name": name})])
            .await
            .unwrap();
        assert!(outcome.is_failed());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags WHERE name = ?")
            .bind(&name)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}

//! Statements with dynamic identifiers
//!
//! Table and column names are taken only from the [`SchemaCatalog`] and
//! re-validated as [`SqlIdent`] before being backtick-quoted. Values are
//! always bound.
//!
//! [`SchemaCatalog`]: super::introspect::SchemaCatalog

use qaeval_core::SqlIdent;
use sqlx::{MySql, QueryBuilder};

use super::error::DbError;
use super::introspect::TableInfo;
use super::value::{push_separated, SqlValue};

/// MySQL prepared statements accept at most 65535 placeholders
pub const MAX_PLACEHOLDERS: usize = 65_535;

/// Multi-row `INSERT INTO t (cols...) VALUES (...), (...)`
#[derive(Debug, Clone)]
pub struct InsertStatement {
    table: SqlIdent,
    columns: Vec<SqlIdent>,
}

impl InsertStatement {
    /// Every column must exist on `table`.
    pub fn new<'a>(
        table: &TableInfo,
        columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, DbError> {
        let mut idents = Vec::new();
        for name in columns {
            let column = table
                .column(name)
                .ok_or_else(|| DbError::not_found("column", format!("{}.{}", table.name(), name)))?;
            idents.push(SqlIdent::new(&column.name)?);
        }
        if idents.is_empty() {
            return Err(qaeval_core::ValidationError::Empty { field: "columns" }.into());
        }
        Ok(Self {
            table: table.ident.clone(),
            columns: idents,
        })
    }

    pub fn columns(&self) -> &[SqlIdent] {
        &self.columns
    }

    pub fn table(&self) -> &SqlIdent {
        &self.table
    }

    /// Largest batch that fits in one statement.
    pub fn max_rows_per_statement(&self) -> usize {
        (MAX_PLACEHOLDERS / self.columns.len()).max(1)
    }

    /// Build the statement for `rows`; each row must have one value per column.
    pub fn build(&self, rows: Vec<Vec<SqlValue>>) -> QueryBuilder<'static, MySql> {
        let column_list = self
            .columns
            .iter()
            .map(SqlIdent::quoted)
            .collect::<Vec<_>>()
            .join(", ");

        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            self.table.quoted(),
            column_list
        ));
        builder.push_values(rows, |mut separated, row| {
            for value in row {
                push_separated(&mut separated, value);
            }
        });
        builder
    }
}

/// `SELECT * FROM t`, ordered by primary key when there is one.
pub fn select_all_sql(table: &TableInfo) -> Result<String, DbError> {
    let mut sql = format!("SELECT * FROM {}", table.ident.quoted());
    if let Some(pk) = table.columns.iter().find(|c| c.key == "PRI") {
        sql.push_str(" ORDER BY ");
        sql.push_str(&SqlIdent::new(&pk.name)?.quoted());
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::introspect::tests::table;
    use crate::db::introspect::ColumnInfo;

    #[test]
    fn builds_multi_row_insert() {
        let tags = table("tags", &["tag_id", "name"]);
        let stmt = InsertStatement::new(&tags, ["name"]).unwrap();
        let builder = stmt.build(vec![
            vec![SqlValue::Text("sql".into())],
            vec![SqlValue::Text("db".into())],
        ]);
        let sql = builder.sql();
        assert!(sql.starts_with("INSERT INTO `tags` (`name`) VALUES"), "{sql}");
        assert_eq!(sql.matches('?').count(), 2);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let tags = table("tags", &["tag_id", "name"]);
        let err = InsertStatement::new(&tags, ["name", "evil`col"]).unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "column", .. }));
    }

    #[test]
    fn empty_column_set_is_rejected() {
        let tags = table("tags", &["tag_id", "name"]);
        assert!(matches!(
            InsertStatement::new(&tags, []),
            Err(DbError::Validation(_))
        ));
    }

    #[test]
    fn batch_size_respects_placeholder_limit() {
        let wide = table("ori_qs", &["ori_qs_id", "content", "source"]);
        let stmt = InsertStatement::new(&wide, ["ori_qs_id", "content", "source"]).unwrap();
        assert_eq!(stmt.max_rows_per_statement(), 21_845);
    }

    #[test]
    fn select_orders_by_primary_key() {
        let mut tags = table("tags", &["name"]);
        let mut pk = ColumnInfo::named("tag_id");
        pk.key = "PRI".into();
        tags.columns.insert(0, pk);
        assert_eq!(
            select_all_sql(&tags).unwrap(),
            "SELECT * FROM `tags` ORDER BY `tag_id`"
        );
        assert_eq!(
            select_all_sql(&table("t", &["a"])).unwrap(),
            "SELECT * FROM `t`"
        );
    }
}

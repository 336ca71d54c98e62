//! Live schema introspection
//!
//! The catalog is the allowlist for every dynamic identifier: a table or
//! column name coming from a request is used only after it resolves here.

use qaeval_core::SqlIdent;
use serde::Serialize;
use sqlx::{MySqlPool, Row};
use tracing::{debug, warn};

use super::error::DbError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: String,
    pub nullable: bool,
    pub key: String,
    pub default: Option<String>,
    pub extra: String,
}

impl ColumnInfo {
    /// Column with only a name, for tests and catalogs built by hand.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            column_type: "text".into(),
            nullable: true,
            key: String::new(),
            default: None,
            extra: String::new(),
        }
    }

    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_lowercase().contains("auto_increment")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    #[serde(serialize_with = "serialize_ident")]
    pub ident: SqlIdent,
    pub columns: Vec<ColumnInfo>,
}

fn serialize_ident<S: serde::Serializer>(ident: &SqlIdent, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(ident.as_str())
}

impl TableInfo {
    pub fn name(&self) -> &str {
        self.ident.as_str()
    }

    /// Exact column match (MySQL column names are case-insensitive, but
    /// import keys are matched as written).
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl std::fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.table, self.column, self.referenced_table, self.referenced_column
        )
    }
}

/// Tables and columns of the connected database
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaCatalog {
    tables: Vec<TableInfo>,
}

impl SchemaCatalog {
    pub fn from_tables(tables: Vec<TableInfo>) -> Self {
        Self { tables }
    }

    /// Read `information_schema.columns` for the current database.
    pub async fn load(pool: &MySqlPool) -> Result<Self, DbError> {
        // CAST: information_schema columns can arrive as VARBINARY on MySQL 8
        let rows = sqlx::query(
            r#"
            SELECT
                CAST(TABLE_NAME AS CHAR) AS table_name,
                CAST(COLUMN_NAME AS CHAR) AS column_name,
                CAST(COLUMN_TYPE AS CHAR) AS column_type,
                CAST(IS_NULLABLE AS CHAR) AS is_nullable,
                CAST(COLUMN_KEY AS CHAR) AS column_key,
                CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
                CAST(EXTRA AS CHAR) AS extra
            FROM information_schema.columns
            WHERE TABLE_SCHEMA = DATABASE()
            ORDER BY TABLE_NAME, ORDINAL_POSITION
            "#,
        )
        .fetch_all(pool)
        .await?;

        let mut tables: Vec<TableInfo> = Vec::new();
        for row in rows {
            let table_name: String = row.try_get("table_name")?;
            let column = ColumnInfo {
                name: row.try_get("column_name")?,
                column_type: row.try_get("column_type")?,
                nullable: row.try_get::<String, _>("is_nullable")? == "YES",
                key: row.try_get("column_key")?,
                default: row.try_get("column_default")?,
                extra: row.try_get("extra")?,
            };

            match tables.last_mut() {
                Some(table) if table.name() == table_name => table.columns.push(column),
                _ => match SqlIdent::new(&table_name) {
                    Ok(ident) => tables.push(TableInfo {
                        ident,
                        columns: vec![column],
                    }),
                    Err(e) => warn!(table = %table_name, error = %e, "skipping table with unusable name"),
                },
            }
        }

        debug!(tables = tables.len(), "schema catalog loaded");
        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[TableInfo] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(TableInfo::name).collect()
    }

    /// Exact name first, then case-insensitive (`user` finds `User`).
    pub fn resolve(&self, name: &str) -> Option<&TableInfo> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .or_else(|| {
                self.tables
                    .iter()
                    .find(|t| t.name().eq_ignore_ascii_case(name))
            })
    }

    /// Like [`resolve`](Self::resolve), failing with a not-found error.
    pub fn require(&self, name: &str) -> Result<&TableInfo, DbError> {
        self.resolve(name)
            .ok_or_else(|| DbError::not_found("table", name))
    }
}

/// Foreign keys of the current database, `table.column -> ref.column`.
pub async fn foreign_keys(pool: &MySqlPool) -> Result<Vec<ForeignKey>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT
            CAST(TABLE_NAME AS CHAR) AS table_name,
            CAST(COLUMN_NAME AS CHAR) AS column_name,
            CAST(REFERENCED_TABLE_NAME AS CHAR) AS referenced_table,
            CAST(REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column
        FROM information_schema.KEY_COLUMN_USAGE
        WHERE REFERENCED_TABLE_SCHEMA = DATABASE()
          AND REFERENCED_TABLE_NAME IS NOT NULL
        ORDER BY TABLE_NAME, COLUMN_NAME
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(ForeignKey {
                table: row.try_get("table_name")?,
                column: row.try_get("column_name")?,
                referenced_table: row.try_get("referenced_table")?,
                referenced_column: row.try_get("referenced_column")?,
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn table(name: &str, columns: &[&str]) -> TableInfo {
        TableInfo {
            ident: SqlIdent::new(name).unwrap(),
            columns: columns.iter().map(|c| ColumnInfo::named(c)).collect(),
        }
    }

    pub(crate) fn sample_catalog() -> SchemaCatalog {
        SchemaCatalog::from_tables(vec![
            table("User", &["user_id", "username", "name", "email", "role"]),
            table("standard_QS", &["std_qs_id", "content", "ori_qs_id", "tag_id"]),
            table("tags", &["tag_id", "name"]),
            table("ori_qs", &["ori_qs_id", "content", "source", "created_at"]),
        ])
    }

    #[test]
    fn resolves_exact_then_case_insensitive() {
        let catalog = sample_catalog();
        assert_eq!(catalog.resolve("tags").unwrap().name(), "tags");
        assert_eq!(catalog.resolve("user").unwrap().name(), "User");
        assert_eq!(catalog.resolve("STANDARD_qs").unwrap().name(), "standard_QS");
        assert!(catalog.resolve("missing").is_none());
        assert!(matches!(
            catalog.require("missing"),
            Err(DbError::NotFound { resource: "table", .. })
        ));
    }

    #[test]
    fn exact_match_wins_over_case_insensitive() {
        let catalog = SchemaCatalog::from_tables(vec![table("Tags", &["a"]), table("tags", &["b"])]);
        assert_eq!(catalog.resolve("tags").unwrap().columns[0].name, "b");
    }

    #[test]
    fn foreign_key_display() {
        let fk = ForeignKey {
            table: "ori_ans".into(),
            column: "ori_qs_id".into(),
            referenced_table: "ori_qs".into(),
            referenced_column: "ori_qs_id".into(),
        };
        assert_eq!(fk.to_string(), "ori_ans.ori_qs_id -> ori_qs.ori_qs_id");
    }
}

//! Table browsing
//!
//! Names from requests are resolved through a fresh [`SchemaCatalog`] before
//! they reach SQL.

use qaeval_core::{Page, Pagination};
use sqlx::MySqlPool;

use crate::db::builder::select_all_sql;
use crate::db::introspect::{SchemaCatalog, TableInfo};
use crate::db::paginate::paginate;
use crate::db::rows::JsonRow;
use crate::db::DbError;

pub struct TableRepo<'a> {
    pool: &'a MySqlPool,
}

impl<'a> TableRepo<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn catalog(&self) -> Result<SchemaCatalog, DbError> {
        SchemaCatalog::load(self.pool).await
    }

    pub async fn list(&self) -> Result<Vec<String>, DbError> {
        let catalog = self.catalog().await?;
        Ok(catalog.table_names().into_iter().map(str::to_owned).collect())
    }

    /// Column layout of one table.
    pub async fn describe(&self, table: &str) -> Result<TableInfo, DbError> {
        let catalog = self.catalog().await?;
        Ok(catalog.require(table)?.clone())
    }

    /// One page of a table's rows.
    pub async fn rows(&self, table: &str, pagination: Pagination) -> Result<Page<JsonRow>, DbError> {
        let catalog = self.catalog().await?;
        let sql = select_all_sql(catalog.require(table)?)?;
        paginate(self.pool, &sql, &[], pagination).await
    }
}

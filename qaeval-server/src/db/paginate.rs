//! Paginated execution of parameterized queries
//!
//! ```text
//! SELECT COUNT(*) FROM (<query>) AS t    → total_count
//! <query> LIMIT ? OFFSET ?               → rows
//! ```
//!
//! Both statements bind the same parameters. Callers pass trusted SQL from
//! this crate only; user input goes through `params`.

use qaeval_core::{Page, Pagination};
use serde::Serialize;
use sqlx::{MySqlPool, Row};
use tracing::debug;

use super::error::DbError;
use super::rows::{rows_to_json, JsonRow};
use super::value::{bind_all, SqlValue};

/// Wire shape of every paginated listing
#[derive(Debug, Clone, Serialize)]
pub struct QueryPage {
    pub success: bool,
    pub message: String,
    pub total_count: u64,
    pub rows: Vec<JsonRow>,
    pub total_pages: u32,
    pub page: u32,
    pub page_size: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<Page<JsonRow>> for QueryPage {
    fn from(page: Page<JsonRow>) -> Self {
        Self {
            success: true,
            message: format!("{} rows in total", page.total_count),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
            total_count: page.total_count,
            rows: page.rows,
            total_pages: page.total_pages,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

/// `SELECT COUNT(*) FROM (<query>) AS t`
pub fn count_sql(query: &str) -> String {
    format!("SELECT COUNT(*) FROM ({}) AS t", query.trim().trim_end_matches(';'))
}

/// `<query> LIMIT ? OFFSET ?`
pub fn page_sql(query: &str) -> String {
    format!("{} LIMIT ? OFFSET ?", query.trim().trim_end_matches(';'))
}

pub async fn paginate(
    pool: &MySqlPool,
    query: &str,
    params: &[SqlValue],
    pagination: Pagination,
) -> Result<Page<JsonRow>, DbError> {
    let count_sql = count_sql(query);
    let total: i64 = bind_all(sqlx::query(&count_sql), params)
        .fetch_one(pool)
        .await?
        .try_get(0)?;
    let total = total.max(0) as u64;

    let page_sql = page_sql(query);
    let rows = bind_all(sqlx::query(&page_sql), params)
        .bind(pagination.limit() as u64)
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

    debug!(total, page = pagination.page, returned = rows.len(), "paginated query");
    Ok(Page::new(rows_to_json(&rows), total, pagination))
}

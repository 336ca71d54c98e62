//! Raw answer listing for the annotation view
//!
//! - list/search: one JOIN query through the paginator, newest first
//! - annotation status derived with CASE over the LEFT JOIN

use qaeval_core::{Page, Pagination};
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::db::paginate::paginate;
use crate::db::rows::JsonRow;
use crate::db::value::SqlValue;
use crate::db::DbError;

const RAW_ANSWERS_BASE: &str = r#"
    SELECT
        oa.ori_ans_id,
        oa.content AS answer_content,
        oa.ori_qs_id,
        oq.content AS question_content,
        oa.created_at AS answer_created,
        CASE WHEN sa.ans_id IS NOT NULL THEN 'annotated' ELSE 'unannotated' END AS annotation_status,
        sa.ans_id AS standard_ans_id,
        CAST(sa.status AS CHAR) AS standard_status
    FROM ori_ans oa
    INNER JOIN ori_qs oq ON oa.ori_qs_id = oq.ori_qs_id
    LEFT JOIN standard_ans sa ON oa.ori_ans_id = sa.ori_ans_id
"#;

const NEWEST_FIRST: &str = " ORDER BY oa.created_at DESC, oa.ori_ans_id DESC";

/// Active user who can be credited with annotations
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Annotator {
    pub user_id: i64,
    pub username: String,
    pub name: String,
}

/// `%term%` with LIKE wildcards in the term escaped
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub struct RawAnswerRepo<'a> {
    pool: &'a MySqlPool,
}

impl<'a> RawAnswerRepo<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Raw answers with their question and annotation status.
    pub async fn list(&self, pagination: Pagination) -> Result<Page<JsonRow>, DbError> {
        let query = format!("{RAW_ANSWERS_BASE}{NEWEST_FIRST}");
        paginate(self.pool, &query, &[], pagination).await
    }

    /// Substring search over answer or question content. A blank term lists everything.
    pub async fn search(&self, term: &str, pagination: Pagination) -> Result<Page<JsonRow>, DbError> {
        if term.trim().is_empty() {
            return self.list(pagination).await;
        }
        let query = format!(
            "{RAW_ANSWERS_BASE} WHERE oa.content LIKE ? OR oq.content LIKE ?{NEWEST_FIRST}"
        );
        let pattern = like_pattern(term);
        let params = [SqlValue::from(pattern.clone()), SqlValue::from(pattern)];
        paginate(self.pool, &query, &params, pagination).await
    }

    pub async fn annotators(&self) -> Result<Vec<Annotator>, DbError> {
        let annotators = sqlx::query_as::<_, Annotator>(
            "SELECT user_id, username, name FROM User WHERE is_active = TRUE ORDER BY username",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(annotators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" join "), "%join%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn list_and_search_share_shape() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        let repo = RawAnswerRepo::new(&pool);

        let all = repo.list(Pagination::new(1, 5)).await.unwrap();
        let none = repo
            .search("no-such-text-anywhere-8c1f", Pagination::new(1, 5))
            .await
            .unwrap();
        assert!(all.rows.len() <= 5);
        assert_eq!(none.total_count, 0);
        assert_eq!(none.total_pages, 0);
    }
}

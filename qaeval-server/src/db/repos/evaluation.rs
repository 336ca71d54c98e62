//! Evaluation repository
//!
//! Standard pairs to score, judge model rows and stored LLM scores.

use qaeval_llm::ModelSpec;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder, Row};
use tracing::{debug, info};

use crate::db::error::is_unique_violation;
use crate::db::DbError;

/// A curated question with its curated answer
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StandardPair {
    pub pair_id: i64,
    pub question: String,
    pub answer: String,
    pub tag: String,
    pub std_qs_id: i64,
    pub ans_id: i64,
}

/// Which pairs to select. A pair id wins over a tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairFilter {
    pub pair_id: Option<i64>,
    pub tag: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct NewEvaluation<'a> {
    pub llm_answer: &'a str,
    pub llm_type_id: i64,
    pub std_ans_id: i64,
    pub llm_score: f64,
}

/// Aggregate scores of one judge model
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ModelStats {
    pub model: String,
    pub evaluations: i64,
    pub avg_score: Option<f64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub stddev_score: Option<f64>,
}

pub struct EvaluationRepo<'a> {
    pool: &'a MySqlPool,
}

impl<'a> EvaluationRepo<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn standard_pairs(&self, filter: &PairFilter) -> Result<Vec<StandardPair>, DbError> {
        let mut qb = QueryBuilder::<MySql>::new(
            r#"
            SELECT sp.pair_id, sq.content AS question, sa.ans_content AS answer,
                   t.name AS tag, sq.std_qs_id, sa.ans_id
            FROM standard_pair sp
            JOIN standard_QS sq ON sp.std_qs_id = sq.std_qs_id
            JOIN standard_ans sa ON sp.std_ans_id = sa.ans_id
            JOIN tags t ON sq.tag_id = t.tag_id
            "#,
        );
        if let Some(pair_id) = filter.pair_id {
            qb.push(" WHERE sp.pair_id = ").push_bind(pair_id);
        } else if let Some(tag) = filter.tag.as_deref().filter(|t| !t.trim().is_empty()) {
            qb.push(" WHERE t.name = ").push_bind(tag.trim().to_owned());
        }
        qb.push(" ORDER BY sp.pair_id");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let pairs = qb.build_query_as::<StandardPair>().fetch_all(self.pool).await?;
        debug!(count = pairs.len(), "standard pairs selected");
        Ok(pairs)
    }

    /// Id of the `llm_type` row for `spec`, inserting it on first use.
    pub async fn ensure_llm_type(&self, spec: &ModelSpec) -> Result<i64, DbError> {
        if let Some(id) = self.llm_type_id(spec.name).await? {
            return Ok(id);
        }

        let inserted = sqlx::query(
            "INSERT INTO llm_type (name, params, costs_per_million_token) VALUES (?, ?, ?)",
        )
        .bind(spec.name)
        .bind(spec.params)
        .bind(spec.cost_per_million_tokens)
        .execute(self.pool)
        .await;

        match inserted {
            Ok(result) => {
                info!(model = spec.name, "llm type registered");
                Ok(result.last_insert_id() as i64)
            }
            // Another request registered it first
            Err(e) if is_unique_violation(&e) => self
                .llm_type_id(spec.name)
                .await?
                .ok_or_else(|| DbError::not_found("llm type", spec.name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn llm_type_id(&self, name: &str) -> Result<Option<i64>, DbError> {
        let row = sqlx::query("SELECT llm_type_id FROM llm_type WHERE name = ?")
            .bind(name)
            .fetch_optional(self.pool)
            .await?;
        Ok(match row {
            Some(row) => Some(row.try_get("llm_type_id")?),
            None => None,
        })
    }

    pub async fn insert_evaluation(&self, eval: NewEvaluation<'_>) -> Result<i64, DbError> {
        let result = sqlx::query(
            "INSERT INTO llm_evaluation (llm_answer, llm_type_id, std_ans_id, llm_score) VALUES (?, ?, ?, ?)",
        )
        .bind(eval.llm_answer)
        .bind(eval.llm_type_id)
        .bind(eval.std_ans_id)
        .bind(eval.llm_score.clamp(0.0, 100.0))
        .execute(self.pool)
        .await?;
        Ok(result.last_insert_id() as i64)
    }

    /// Count, mean, min, max and standard deviation of stored scores per model.
    pub async fn model_stats(&self, model: Option<&str>) -> Result<Vec<ModelStats>, DbError> {
        let mut qb = QueryBuilder::<MySql>::new(
            r#"
            SELECT
                lt.name AS model,
                COUNT(*) AS evaluations,
                CAST(AVG(le.llm_score) AS DOUBLE) AS avg_score,
                CAST(MIN(le.llm_score) AS DOUBLE) AS min_score,
                CAST(MAX(le.llm_score) AS DOUBLE) AS max_score,
                CAST(STDDEV(le.llm_score) AS DOUBLE) AS stddev_score
            FROM llm_evaluation le
            JOIN llm_type lt ON le.llm_type_id = lt.llm_type_id
            "#,
        );
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            qb.push(" WHERE lt.name = ").push_bind(model.trim().to_owned());
        }
        qb.push(" GROUP BY lt.name ORDER BY avg_score DESC");

        Ok(qb.build_query_as::<ModelStats>().fetch_all(self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_filter_from_query_string_shape() {
        let filter: PairFilter = serde_json::from_value(serde_json::json!({"tag": "sql", "limit": 5})).unwrap();
        assert_eq!(filter.tag.as_deref(), Some("sql"));
        assert_eq!(filter.limit, Some(5));
        assert!(filter.pair_id.is_none());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn llm_type_is_created_once() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::schema::create_tables(&pool).await;

        let repo = EvaluationRepo::new(&pool);
        let spec = &qaeval_llm::BUILTIN_MODELS[0];
        let first = repo.ensure_llm_type(spec).await.unwrap();
        let second = repo.ensure_llm_type(spec).await.unwrap();
        assert_eq!(first, second);
    }
}

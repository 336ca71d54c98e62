//! LLM evaluation endpoints (llm_evaluation)

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use qaeval_core::{Permission, ValidationError, DEFAULT_CRITERIA};
use qaeval_llm::{ModelAvailability, PairEvaluation};
use serde::Deserialize;

use crate::db::repos::{EvaluationRepo, ModelStats, PairFilter, StandardPair};
use crate::evaluation::{BatchEvaluator, BatchReport};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub model: String,
    pub criteria: Option<String>,
    pub tag: Option<String>,
    pub pair_id: Option<i64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AdHocRequest {
    pub model: String,
    pub question: String,
    pub answer: String,
    pub criteria: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub model: Option<String>,
}

/// GET /evaluation/models
async fn models(State(state): State<Arc<AppState>>, auth: AuthUser) -> Result<Json<Vec<ModelAvailability>>, ApiError> {
    auth.require(Permission::LlmEvaluation)?;
    Ok(Json(state.evaluator.registry().models()))
}

/// GET /evaluation/pairs?tag=&pair_id=&limit=
async fn list_pairs(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(filter): Query<PairFilter>,
) -> Result<Json<Vec<StandardPair>>, ApiError> {
    auth.require(Permission::LlmEvaluation)?;
    Ok(Json(EvaluationRepo::new(&state.pool).standard_pairs(&filter).await?))
}

/// POST /evaluation/pairs - score one question/answer without storing it
async fn evaluate_pair(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<AdHocRequest>,
) -> Result<Json<PairEvaluation>, ApiError> {
    auth.require(Permission::LlmEvaluation)?;
    if req.question.trim().is_empty() {
        return Err(ValidationError::Empty { field: "question" }.into());
    }
    if req.answer.trim().is_empty() {
        return Err(ValidationError::Empty { field: "answer" }.into());
    }
    state.evaluator.check_model(&req.model)?;

    let criteria = req
        .criteria
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CRITERIA);
    let result = state
        .evaluator
        .evaluate_pair(&req.model, &req.question, &req.answer, criteria)
        .await;
    Ok(Json(result))
}

/// POST /evaluation/run - score stored pairs and persist the results
async fn run(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<RunRequest>,
) -> Result<Json<BatchReport>, ApiError> {
    auth.require(Permission::LlmEvaluation)?;
    let filter = PairFilter {
        pair_id: req.pair_id,
        tag: req.tag,
        limit: req.limit,
    };
    let report = BatchEvaluator::new(&state.pool, &state.evaluator)
        .run(&req.model, req.criteria.as_deref(), &filter)
        .await?;
    Ok(Json(report))
}

/// GET /evaluation/stats?model=
async fn stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<StatsParams>,
) -> Result<Json<Vec<ModelStats>>, ApiError> {
    auth.require(Permission::LlmEvaluation)?;
    let stats = EvaluationRepo::new(&state.pool)
        .model_stats(params.model.as_deref())
        .await?;
    Ok(Json(stats))
}

/// Evaluation routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/evaluation/models", get(models))
        .route("/evaluation/pairs", get(list_pairs).post(evaluate_pair))
        .route("/evaluation/run", post(run))
        .route("/evaluation/stats", get(stats))
}

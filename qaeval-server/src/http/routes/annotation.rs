//! Annotation endpoints
//!
//! Listings remember the last page per session: a request without `page`
//! resumes where the caller left off.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use qaeval_core::{AnswerStatus, Pagination, Permission};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::repos::{
    AnnotationRepo, AnnotationStats, Annotator, PromoteAnswer, PromoteQuestion, Promoted, RawAnswerRepo, TagRef,
};
use crate::db::QueryPage;
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, ValidId};
use crate::http::server::AppState;

const ANSWERS_VIEW: &str = "annotation-answers";

#[derive(Debug, Default, Deserialize)]
pub struct AnswerListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PromoteAnswerRequest {
    pub content: Option<String>,
    pub quality_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PromoteQuestionRequest {
    pub content: Option<String>,
    pub tag: TagRef,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// GET /annotation/answers?search=&page=&page_size=
async fn list_answers(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<AnswerListParams>,
) -> Result<Json<QueryPage>, ApiError> {
    auth.require(Permission::ViewAll)?;

    let page = match params.page {
        Some(p) => p,
        None => state.sessions.page(auth.session_id, ANSWERS_VIEW).await.unwrap_or(1),
    };
    let pagination = Pagination::new(page, params.page_size.unwrap_or(10));

    let repo = RawAnswerRepo::new(&state.pool);
    let result = match params.search.as_deref() {
        Some(term) => repo.search(term, pagination).await?,
        None => repo.list(pagination).await?,
    };
    state
        .sessions
        .set_page(auth.session_id, ANSWERS_VIEW, pagination.page)
        .await;
    Ok(Json(result.into()))
}

/// GET /annotation/stats - cached per session for 30 seconds
async fn stats(State(state): State<Arc<AppState>>, auth: AuthUser) -> Result<Json<AnnotationStats>, ApiError> {
    auth.require(Permission::ViewAll)?;
    if let Some(cached) = state.sessions.cached_stats(auth.session_id).await {
        return Ok(Json(cached));
    }
    let stats = AnnotationRepo::new(&state.pool).stats().await?;
    state.sessions.cache_stats(auth.session_id, stats.clone()).await;
    Ok(Json(stats))
}

/// GET /annotation/annotators
async fn annotators(State(state): State<Arc<AppState>>, auth: AuthUser) -> Result<Json<Vec<Annotator>>, ApiError> {
    auth.require(Permission::ViewAll)?;
    Ok(Json(RawAnswerRepo::new(&state.pool).annotators().await?))
}

/// POST /annotation/answers/{id}/promote
async fn promote_answer(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidId(ori_ans_id): ValidId,
    body: Option<Json<PromoteAnswerRequest>>,
) -> Result<(StatusCode, Json<Promoted>), ApiError> {
    auth.require(Permission::ManageData)?;
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let promoted = AnnotationRepo::new(&state.pool)
        .promote_answer(PromoteAnswer {
            ori_ans_id,
            content: req.content,
            created_by: Some(auth.user_id()),
            quality_score: req.quality_score,
        })
        .await?;
    state.sessions.invalidate_stats().await;
    Ok((StatusCode::CREATED, Json(promoted)))
}

/// POST /annotation/questions/{id}/promote
async fn promote_question(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidId(ori_qs_id): ValidId,
    Json(req): Json<PromoteQuestionRequest>,
) -> Result<(StatusCode, Json<Promoted>), ApiError> {
    auth.require(Permission::ManageData)?;
    let promoted = AnnotationRepo::new(&state.pool)
        .promote_question(PromoteQuestion {
            ori_qs_id,
            content: req.content,
            tag: req.tag,
            created_by: Some(auth.user_id()),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(promoted)))
}

/// PUT /annotation/standard-answers/{id}/status
async fn update_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidId(ans_id): ValidId,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Value>, ApiError> {
    auth.require(Permission::ManageData)?;
    let status: AnswerStatus = req.status.parse()?;
    AnnotationRepo::new(&state.pool)
        .update_status(ans_id, status, Some(auth.user_id()))
        .await?;
    state.sessions.invalidate_stats().await;
    Ok(Json(json!({ "success": true, "ans_id": ans_id, "status": status })))
}

/// Annotation routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/annotation/answers", get(list_answers))
        .route("/annotation/stats", get(stats))
        .route("/annotation/annotators", get(annotators))
        .route("/annotation/answers/{id}/promote", post(promote_answer))
        .route("/annotation/questions/{id}/promote", post(promote_question))
        .route("/annotation/standard-answers/{id}/status", put(update_status))
}

//! Report catalog endpoints (view_all)

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use qaeval_core::{Pagination, PaginationParams, Permission};

use crate::db::QueryPage;
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::reports::{self, Report, REPORTS};

/// GET /reports
async fn list_reports(auth: AuthUser) -> Result<Json<&'static [Report]>, ApiError> {
    auth.require(Permission::ViewAll)?;
    Ok(Json(REPORTS))
}

/// GET /reports/{name}
async fn run_report(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(name): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<QueryPage>, ApiError> {
    auth.require(Permission::ViewAll)?;
    let page = reports::run(&state.pool, &name, Pagination::from(params)).await?;
    Ok(Json(page.into()))
}

/// Report routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/{name}", get(run_report))
}

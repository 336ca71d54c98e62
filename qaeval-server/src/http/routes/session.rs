//! Per-session view state

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PageState {
    pub view: String,
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetPageRequest {
    pub page: u32,
}

/// GET /session/pages/{view}
async fn get_page(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(view): Path<String>,
) -> Result<Json<PageState>, ApiError> {
    let page = state
        .sessions
        .page(auth.session_id, &view)
        .await
        .ok_or(AuthError::SessionExpired)?;
    Ok(Json(PageState { view, page }))
}

/// PUT /session/pages/{view}
async fn set_page(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(view): Path<String>,
    Json(req): Json<SetPageRequest>,
) -> Result<Json<PageState>, ApiError> {
    let page = req.page.max(1);
    if !state.sessions.set_page(auth.session_id, &view, page).await {
        return Err(AuthError::SessionExpired.into());
    }
    Ok(Json(PageState { view, page }))
}

/// Session routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/session/pages/{view}", get(get_page).put(set_page))
}

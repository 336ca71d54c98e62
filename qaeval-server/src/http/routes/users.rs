//! User management endpoints (manage_users)

use std::sync::Arc;

use axum::{extract::{Query, State}, routing::{get, post}, Json, Router};
use qaeval_core::{Pagination, PaginationParams, Permission, Role};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthService;
use crate::db::repos::{UserRepo, UserStats};
use crate::db::QueryPage;
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, ValidId};
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// GET /users
async fn list_users(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<UserListParams>,
) -> Result<Json<QueryPage>, ApiError> {
    auth.require(Permission::ManageUsers)?;
    let role = match params.role.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(r) => Some(r.parse::<Role>()?),
    };
    let page = UserRepo::new(&state.pool)
        .list(
            role,
            Pagination::from(PaginationParams {
                page: params.page,
                page_size: params.page_size,
            }),
        )
        .await?;
    Ok(Json(page.into()))
}

/// GET /users/stats
async fn user_stats(State(state): State<Arc<AppState>>, auth: AuthUser) -> Result<Json<UserStats>, ApiError> {
    auth.require(Permission::ManageUsers)?;
    Ok(Json(UserRepo::new(&state.pool).stats().await?))
}

/// GET /users/{id}/logins
async fn login_history(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidId(user_id): ValidId,
    Query(params): Query<PaginationParams>,
) -> Result<Json<QueryPage>, ApiError> {
    auth.require(Permission::ManageUsers)?;
    let repo = UserRepo::new(&state.pool);
    repo.get(user_id).await?;
    let page = repo
        .login_history(user_id, Pagination::from(params))
        .await?;
    Ok(Json(page.into()))
}

/// POST /users/{id}/active
async fn set_active(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidId(user_id): ValidId,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<Value>, ApiError> {
    auth.require(Permission::ManageUsers)?;
    if user_id == auth.user_id() && !req.active {
        return Err(ApiError::bad_request("cannot deactivate your own account"));
    }
    AuthService::new(&state.pool, &state.tokens, &state.sessions)
        .set_active(user_id, req.active)
        .await?;
    Ok(Json(json!({ "success": true, "user_id": user_id, "active": req.active })))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/stats", get(user_stats))
        .route("/users/{id}/logins", get(login_history))
        .route("/users/{id}/active", post(set_active))
}

//! Identity endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use qaeval_core::{Permission, Role};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{AuthService, LoginResponse, Registration, SessionUser};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub login: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: SessionUser,
    pub permissions: &'static [Permission],
}

fn service(state: &AppState) -> AuthService<'_> {
    AuthService::new(&state.pool, &state.tokens, &state.sessions)
}

/// POST /auth/register - self-service accounts; admins are bootstrapped from the CLI
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Registration>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if req.role == Role::Admin {
        return Err(ApiError::Forbidden {
            reason: "admin accounts cannot be self-registered".into(),
        });
    }
    let user_id = service(&state).register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user_id": user_id, "message": "registration successful" })),
    ))
}

/// POST /auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = service(&state).login(&req.login, &req.password).await?;
    Ok(Json(response))
}

/// POST /auth/logout - ends the caller's session, revoking its token
async fn logout(State(state): State<Arc<AppState>>, auth: AuthUser) -> Json<Value> {
    let removed = service(&state).logout(auth.session_id).await;
    Json(json!({ "success": removed }))
}

/// GET /auth/me
async fn me(auth: AuthUser) -> Json<MeResponse> {
    let permissions = auth.user.role.permissions();
    Json(MeResponse {
        user: auth.user,
        permissions,
    })
}

/// POST /auth/password
async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    service(&state)
        .change_password(auth.user_id(), &req.old_password, &req.new_password)
        .await?;
    Ok(Json(json!({ "success": true, "message": "password changed" })))
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/password", post(change_password))
}

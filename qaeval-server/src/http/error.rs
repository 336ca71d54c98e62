//! API error types with IntoResponse
//!
//! Errors are converted to JSON `{ "error", "message" }` responses with an
//! appropriate status code. Database and internal details are logged, never
//! returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qaeval_core::ValidationError;
use qaeval_llm::LlmError;
use serde_json::json;

use crate::auth::AuthError;
use crate::db::DbError;
use crate::evaluation::EvaluationError;
use crate::import::ImportError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Bad request body or parameters (400)
    BadRequest { message: String },

    /// Missing or rejected credentials (401)
    Unauthorized { message: String },

    /// Authenticated but not permitted (403)
    Forbidden { reason: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Conflicts with existing data (409)
    Conflict { message: String },

    /// LLM provider failed or is not configured (502)
    Upstream(LlmError),

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500)
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "bad_request",
                    "message": message
                }),
            ),
            Self::Unauthorized { message } => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": message
                }),
            ),
            Self::Forbidden { reason } => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "forbidden",
                    "message": reason
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Conflict { message } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": message
                }),
            ),
            Self::Upstream(e) => {
                tracing::warn!("LLM provider error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error": "upstream_error",
                        "message": e.to_string()
                    }),
                )
            }
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { reason } => Self::Conflict { message: reason },
            DbError::Validation(v) => Self::Validation(v),
            _ => Self::Database(e),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::UnknownModel(name) => Self::NotFound {
                resource: "model",
                id: name,
            },
            _ => Self::Upstream(e),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::Db(db) => db.into(),
            ImportError::Validation(v) => Self::Validation(v),
            ImportError::Csv(csv) => Self::bad_request(format!("CSV parse error: {csv}")),
        }
    }
}

impl From<EvaluationError> for ApiError {
    fn from(e: EvaluationError) -> Self {
        match e {
            EvaluationError::Llm(llm) => llm.into(),
            EvaluationError::Db(db) => db.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::SessionExpired => {
                Self::unauthorized(e.to_string())
            }
            AuthError::Forbidden(_) => Self::Forbidden {
                reason: e.to_string(),
            },
            AuthError::AdminExists => Self::Conflict {
                message: e.to_string(),
            },
            AuthError::Db(db) => db.into(),
            AuthError::Validation(v) => Self::Validation(v),
            AuthError::MissingSecret
            | AuthError::Hash(_)
            | AuthError::Token(_)
            | AuthError::Join(_) => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}

//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use qaeval_core::{Permission, ValidationError};
use uuid::Uuid;

use super::error::ApiError;
use super::server::AppState;
use crate::auth::{AuthError, SessionUser};

/// Authenticated caller: a valid bearer token whose session still exists
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: SessionUser,
    pub session_id: Uuid,
}

impl AuthUser {
    /// Fail with 403 unless the caller's role grants `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.user.role.has(permission) {
            Ok(())
        } else {
            tracing::debug!(user_id = self.user.user_id, permission = permission.as_str(), "permission denied");
            Err(AuthError::Forbidden(permission).into())
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user.user_id
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        let claims = state.tokens.verify(token)?;
        let user = state
            .sessions
            .user(claims.sid)
            .await
            .ok_or(AuthError::SessionExpired)?;

        Ok(Self {
            user,
            session_id: claims.sid,
        })
    }
}

/// Extract and validate a numeric id from path
pub struct ValidId(pub i64);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        match id.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "must be a positive integer",
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/auth/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("bearer abc "))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }

    #[test]
    fn require_checks_role() {
        let guest = AuthUser {
            user: SessionUser {
                user_id: 2,
                username: "guest".into(),
                name: "Guest".into(),
                role: qaeval_core::Role::Guest,
            },
            session_id: Uuid::new_v4(),
        };
        assert!(guest.require(Permission::ViewBasic).is_ok());
        assert!(guest.require(Permission::ViewAll).is_err());
    }
}

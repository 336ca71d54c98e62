//! Identity: bcrypt passwords, HS256 tokens and server-side sessions

pub mod password;
pub mod service;
pub mod session;
pub mod token;

use qaeval_core::{Permission, ValidationError};

use crate::db::DbError;

pub use service::{AuthService, LoginResponse, Registration, DEFAULT_ADMIN_USERNAME};
pub use session::{SessionStore, SessionUser};
pub use token::{Claims, TokenKeys};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("missing permission: {}", .0.as_str())]
    Forbidden(Permission),

    #[error("an admin account already exists")]
    AdminExists,

    #[error("JWT_SECRET is not configured")]
    MissingSecret,

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

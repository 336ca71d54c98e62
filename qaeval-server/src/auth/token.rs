//! HS256 access tokens
//!
//! A token names its session (`sid`); the session must still exist for the
//! token to be accepted, so logout revokes it.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use qaeval_core::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string
    pub sub: String,
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    /// Session id
    pub sid: Uuid,
    pub exp: i64,
    pub iat: i64,
}

pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(ttl_hours.max(1)),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: i64, username: &str, role: Role, sid: Uuid) -> Result<(String, Claims), AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            username: username.to_owned(),
            role,
            sid,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok((token, claims))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let keys = TokenKeys::new("test-secret", 24).unwrap();
        let sid = Uuid::new_v4();
        let (token, claims) = keys.issue(7, "alice", Role::Evaluator, sid).unwrap();
        let decoded = keys.verify(&token).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.sub, "7");
        assert_eq!(decoded.exp - decoded.iat, 24 * 3600);
    }

    #[test]
    fn other_secret_is_rejected() {
        let (token, _) = TokenKeys::new("one", 1)
            .unwrap()
            .issue(1, "a", Role::Guest, Uuid::new_v4())
            .unwrap();
        let other = TokenKeys::new("two", 1).unwrap();
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
        assert!(matches!(other.verify("garbage"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenKeys::new("  ", 24), Err(AuthError::MissingSecret)));
    }
}

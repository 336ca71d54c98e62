//! Account input validation: usernames, emails, password strength

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MAX_NAME_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("invalid email regex")
});
static HAS_LETTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]").expect("invalid letter regex"));
static HAS_DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("invalid digit regex"));

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len < MIN_USERNAME_LEN {
        return Err(ValidationError::TooShort {
            field: "username",
            min: MIN_USERNAME_LEN,
        });
    }
    if len > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username",
            max: MAX_USERNAME_LEN,
        });
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" });
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name",
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "not a valid email address",
        })
    }
}

/// Password strength: at least 8 characters with a letter and a digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password",
            min: MIN_PASSWORD_LEN,
        });
    }
    if !HAS_LETTER_RE.is_match(password) {
        return Err(ValidationError::InvalidFormat {
            field: "password",
            reason: "must contain a letter",
        });
    }
    if !HAS_DIGIT_RE.is_match(password) {
        return Err(ValidationError::InvalidFormat {
            field: "password",
            reason: "must contain a digit",
        });
    }
    Ok(())
}

/// Annotator quality score, 0.0 to 5.0 inclusive.
pub fn validate_quality_score(score: f64) -> Result<(), ValidationError> {
    if score.is_finite() && (0.0..=5.0).contains(&score) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "quality_score",
            min: 0.0,
            max: 5.0,
        })
    }
}

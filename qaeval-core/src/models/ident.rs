//! SQL identifier validation
//!
//! Table and column names are the only parts of a statement that cannot be
//! bound as parameters. They are accepted only if they match a conservative
//! identifier pattern; the server additionally checks them against the live
//! schema before quoting.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum identifier length accepted by MySQL
const MAX_IDENT_LEN: usize = 64;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex"));

/// Validated table or column name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlIdent(String);

impl SqlIdent {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "identifier" });
        }

        if s.len() > MAX_IDENT_LEN {
            return Err(ValidationError::TooLong {
                field: "identifier",
                max: MAX_IDENT_LEN,
            });
        }

        if !IDENT_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "identifier",
                reason: "must contain only letters, digits and underscores, not starting with a digit",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backtick-quoted form for interpolation into SQL.
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl AsRef<str> for SqlIdent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

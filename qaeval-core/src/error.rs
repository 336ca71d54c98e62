/// Structured error types for qaeval-core.
///
/// Library consumers get composable `thiserror` errors; the `qaeval`
/// binary wraps them in `anyhow` with context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::ValidationError;

/// Main error type for qaeval-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// TOML config file could not be parsed
    #[error("Invalid config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Configuration is missing a value or holds an invalid one
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Domain validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type alias for qaeval-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::config("DB_HOST cannot be empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: DB_HOST cannot be empty"
        );

        let err: CoreError = ValidationError::Empty { field: "username" }.into();
        assert_eq!(err.to_string(), "username cannot be empty");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();

        assert!(matches!(err, CoreError::Io { .. }));
    }
}

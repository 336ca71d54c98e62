use thiserror::Error;

/// Maximum characters of an upstream error body kept in the error
pub(crate) const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("unsupported model: {0}")]
    UnknownModel(String),

    #[error("{var} is not set; {provider} models are unavailable")]
    MissingApiKey {
        provider: &'static str,
        var: &'static str,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned no completion text")]
    EmptyCompletion { provider: &'static str },
}

impl LlmError {
    /// API error with the body truncated so upstream details stay out of logs.
    pub(crate) fn api(provider: &'static str, status: u16, body: &str) -> Self {
        let body = if body.chars().count() > MAX_ERROR_BODY {
            let cut: String = body.chars().take(MAX_ERROR_BODY).collect();
            format!("{}...", cut)
        } else {
            body.to_owned()
        };
        Self::Api {
            provider,
            status,
            body,
        }
    }
}

//! Chat-completion provider trait and implementations
//!
//! - OpenAI chat completions (`openai`)
//! - Anthropic messages (`anthropic`)
//! - Mock provider for tests, replaying canned replies

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Temperature used for every judge call unless overridden
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Upper bound on tokens in a judge reply
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Vendor behind a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Single-turn chat completion
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Send one user message to `model` and return the reply text.
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;
}

/// Mock provider for testing
pub struct MockProvider {
    kind: ProviderKind,
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply for the next call
    pub fn push_reply(&self, text: impl Into<String>) {
        self.lock_replies().push_back(Ok(text.into()));
    }

    /// Queue an upstream failure for the next call
    pub fn push_error(&self, body: impl Into<String>) {
        self.lock_replies().push_back(Err(body.into()));
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        match self.prompts.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        match self.replies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete(
        &self,
        _model: &str,
        prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        match self.prompts.lock() {
            Ok(mut guard) => guard.push(prompt.to_owned()),
            Err(poisoned) => poisoned.into_inner().push(prompt.to_owned()),
        }
        match self.lock_replies().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(body)) => Err(LlmError::api("mock", 500, &body)),
            None => Err(LlmError::EmptyCompletion { provider: "mock" }),
        }
    }
}

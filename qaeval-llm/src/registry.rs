//! Model registry
//!
//! Every judge model is an explicit [`ModelSpec`]: display name, vendor, API
//! model id, size, price and capabilities. Dispatch goes through the spec's
//! [`ProviderKind`]; a model is available only when its provider was
//! configured with an API key.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use qaeval_core::config::LlmConfig;
use serde::Serialize;
use tracing::{info, warn};

use crate::anthropic::AnthropicProvider;
use crate::error::LlmError;
use crate::openai::OpenAiProvider;
use crate::provider::{ChatProvider, ProviderKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Single-turn chat completion
    Chat,
    /// Follows "reply with JSON only" instructions reliably
    JsonOutput,
    /// Context window of 100k tokens or more
    LongContext,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpec {
    pub name: &'static str,
    pub provider: ProviderKind,
    pub api_model: &'static str,
    /// Parameter count
    pub params: u64,
    /// USD per million tokens
    pub cost_per_million_tokens: f64,
    pub capabilities: &'static [Capability],
}

impl ModelSpec {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

pub static BUILTIN_MODELS: &[ModelSpec] = &[
    ModelSpec {
        name: "GPT-4",
        provider: ProviderKind::OpenAi,
        api_model: "gpt-4",
        params: 1_000_000_000_000,
        cost_per_million_tokens: 30.0,
        capabilities: &[Capability::Chat, Capability::JsonOutput],
    },
    ModelSpec {
        name: "GPT-3.5-Turbo",
        provider: ProviderKind::OpenAi,
        api_model: "gpt-3.5-turbo",
        params: 175_000_000_000,
        cost_per_million_tokens: 0.5,
        capabilities: &[Capability::Chat],
    },
    ModelSpec {
        name: "Claude-3-Opus",
        provider: ProviderKind::Anthropic,
        api_model: "claude-3-opus-20240229",
        params: 500_000_000_000,
        cost_per_million_tokens: 15.0,
        capabilities: &[Capability::Chat, Capability::JsonOutput, Capability::LongContext],
    },
    ModelSpec {
        name: "Claude-3-Sonnet",
        provider: ProviderKind::Anthropic,
        api_model: "claude-3-sonnet-20240229",
        params: 200_000_000_000,
        cost_per_million_tokens: 3.0,
        capabilities: &[Capability::Chat, Capability::JsonOutput, Capability::LongContext],
    },
];

/// A model and whether it can be called right now
#[derive(Debug, Clone, Serialize)]
pub struct ModelAvailability {
    #[serde(flatten)]
    pub spec: ModelSpec,
    pub available: bool,
}

pub struct ProviderRegistry {
    specs: Vec<ModelSpec>,
    providers: HashMap<ProviderKind, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    /// Registry with the built-in specs and no providers.
    pub fn new() -> Self {
        Self {
            specs: BUILTIN_MODELS.to_vec(),
            providers: HashMap::new(),
        }
    }

    /// Register providers for every vendor that has an API key.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut registry = Self::new();

        match config.openai_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                registry = registry.with_provider(Arc::new(OpenAiProvider::new(
                    http.clone(),
                    key,
                    &config.openai_base_url,
                )));
            }
            _ => warn!("OPENAI_API_KEY not set, OpenAI models unavailable"),
        }

        match config.anthropic_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                registry = registry.with_provider(Arc::new(AnthropicProvider::new(
                    http,
                    key,
                    &config.anthropic_base_url,
                )));
            }
            _ => warn!("ANTHROPIC_API_KEY not set, Anthropic models unavailable"),
        }

        info!(
            providers = registry.providers.len(),
            models = registry.specs.len(),
            "model registry ready"
        );
        Ok(registry)
    }

    pub fn with_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn spec(&self, name: &str) -> Option<&ModelSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn is_available(&self, spec: &ModelSpec) -> bool {
        self.providers.contains_key(&spec.provider)
    }

    pub fn models(&self) -> Vec<ModelAvailability> {
        self.specs
            .iter()
            .map(|spec| ModelAvailability {
                spec: spec.clone(),
                available: self.is_available(spec),
            })
            .collect()
    }

    /// Names of models that can be called, in registry order.
    pub fn available_names(&self) -> Vec<&'static str> {
        self.specs
            .iter()
            .filter(|s| self.is_available(s))
            .map(|s| s.name)
            .collect()
    }

    /// Spec and provider for a chat-capable model.
    pub fn resolve(&self, name: &str) -> Result<(&ModelSpec, Arc<dyn ChatProvider>), LlmError> {
        let spec = self
            .spec(name)
            .filter(|s| s.supports(Capability::Chat))
            .ok_or_else(|| LlmError::UnknownModel(name.to_owned()))?;

        let provider = self
            .providers
            .get(&spec.provider)
            .cloned()
            .ok_or(LlmError::MissingApiKey {
                provider: match spec.provider {
                    ProviderKind::OpenAi => "OpenAI",
                    ProviderKind::Anthropic => "Anthropic",
                },
                var: spec.provider.api_key_var(),
            })?;

        Ok((spec, provider))
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;

    #[test]
    fn builtin_specs() {
        let registry = ProviderRegistry::new();
        let gpt4 = registry.spec("GPT-4").unwrap();
        assert_eq!(gpt4.api_model, "gpt-4");
        assert_eq!(gpt4.cost_per_million_tokens, 30.0);

        let sonnet = registry.spec("Claude-3-Sonnet").unwrap();
        assert_eq!(sonnet.provider, ProviderKind::Anthropic);
        assert_eq!(sonnet.params, 200_000_000_000);
        assert!(sonnet.supports(Capability::LongContext));
    }

    #[test]
    fn resolve_errors() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.resolve("GPT-5"),
            Err(LlmError::UnknownModel(_))
        ));
        assert!(matches!(
            registry.resolve("GPT-4"),
            Err(LlmError::MissingApiKey { var: "OPENAI_API_KEY", .. })
        ));
    }

    #[test]
    fn availability_follows_providers() {
        let registry = ProviderRegistry::new()
            .with_provider(Arc::new(MockProvider::new(ProviderKind::Anthropic)));

        assert_eq!(
            registry.available_names(),
            vec!["Claude-3-Opus", "Claude-3-Sonnet"]
        );
        let (spec, provider) = registry.resolve("Claude-3-Opus").unwrap();
        assert_eq!(spec.api_model, "claude-3-opus-20240229");
        assert_eq!(provider.kind(), ProviderKind::Anthropic);

        let models = registry.models();
        assert_eq!(models.len(), 4);
        assert!(!models[0].available);
        assert!(models[2].available);
    }

    #[test]
    fn from_config_without_keys_has_no_providers() {
        let registry = ProviderRegistry::from_config(&LlmConfig::default()).unwrap();
        assert!(registry.available_names().is_empty());
    }
}

use std::sync::Arc;

use qaeval_core::prompt::render_evaluation_prompt;
use qaeval_core::scoring::{parse_evaluation, ParsedEvaluation};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::LlmError;
use crate::provider::CompletionOptions;
use crate::registry::{ModelSpec, ProviderRegistry};

/// Outcome of one judge call. Never an error: failures are carried in
/// `parsed.error` with all-zero scores.
#[derive(Debug, Clone, Serialize)]
pub struct PairEvaluation {
    pub model: String,
    #[serde(flatten)]
    pub parsed: ParsedEvaluation,
    /// Reply text, absent when the provider call itself failed
    pub raw_response: Option<String>,
}

impl PairEvaluation {
    pub fn is_success(&self) -> bool {
        self.parsed.is_success()
    }

    pub fn total_score(&self) -> f64 {
        self.parsed.scores.total_score
    }
}

/// Scores question/answer pairs with a registered model.
#[derive(Clone)]
pub struct Evaluator {
    registry: Arc<ProviderRegistry>,
    options: CompletionOptions,
}

impl Evaluator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            options: CompletionOptions::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = temperature;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Fail fast before a batch: the model must exist and have a provider.
    pub fn check_model(&self, model: &str) -> Result<&ModelSpec, LlmError> {
        self.registry.resolve(model).map(|(spec, _)| spec)
    }

    /// One provider call, no retries.
    pub async fn evaluate_pair(
        &self,
        model: &str,
        question: &str,
        answer: &str,
        criteria: &str,
    ) -> PairEvaluation {
        let (spec, provider) = match self.registry.resolve(model) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(model, error = %e, "model unavailable");
                return PairEvaluation {
                    model: model.to_owned(),
                    parsed: ParsedEvaluation::failed(format!("evaluation failed: {}", e)),
                    raw_response: None,
                };
            }
        };

        let prompt = render_evaluation_prompt(question, answer, criteria);

        match provider.complete(spec.api_model, &prompt, &self.options).await {
            Ok(reply) => {
                debug!(model, reply = %reply, "judge reply");
                let parsed = parse_evaluation(&reply);
                match &parsed.error {
                    None => info!(model, total = parsed.scores.total_score, "pair evaluated"),
                    Some(e) => warn!(model, method = ?parsed.method, error = %e, "judge reply was not clean JSON"),
                }
                PairEvaluation {
                    model: model.to_owned(),
                    parsed,
                    raw_response: Some(reply),
                }
            }
            Err(e) => {
                warn!(model, error = %e, "judge call failed");
                PairEvaluation {
                    model: model.to_owned(),
                    parsed: ParsedEvaluation::failed(format!("evaluation failed: {}", e)),
                    raw_response: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockProvider, ProviderKind};
    use qaeval_core::scoring::ParseMethod;

    fn evaluator_with(mock: Arc<MockProvider>) -> Evaluator {
        let registry = ProviderRegistry::new().with_provider(mock);
        Evaluator::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn clean_reply_scores_the_pair() {
        let mock = Arc::new(MockProvider::new(ProviderKind::OpenAi));
        mock.push_reply(
            "```json\n{\"accuracy\": 90, \"completeness\": 80, \"clarity\": 70, \
             \"professionalism\": 60, \"relevance\": 50, \"reasoning\": \"fine\"}\n```",
        );
        let evaluator = evaluator_with(mock.clone());

        let result = evaluator
            .evaluate_pair("GPT-4", "What is a join?", "Combining rows.", "")
            .await;

        assert!(result.is_success());
        assert_eq!(result.total_score(), 70.0);
        assert_eq!(result.parsed.method, ParseMethod::Json);
        assert!(result.raw_response.is_some());

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("What is a join?"));
        assert!(prompts[0].contains("Combining rows."));
    }

    #[tokio::test]
    async fn provider_failure_is_zero_scored() {
        let mock = Arc::new(MockProvider::new(ProviderKind::OpenAi));
        mock.push_error("rate limited");
        let evaluator = evaluator_with(mock.clone());

        let result = evaluator.evaluate_pair("GPT-3.5-Turbo", "q", "a", "").await;

        assert!(!result.is_success());
        assert_eq!(result.total_score(), 0.0);
        assert!(result.raw_response.is_none());
        assert!(result.parsed.error.unwrap().contains("rate limited"));
        assert_eq!(mock.prompts().len(), 1);
    }

    #[tokio::test]
    async fn unconfigured_provider_never_calls_out() {
        let mock = Arc::new(MockProvider::new(ProviderKind::OpenAi));
        let evaluator = evaluator_with(mock.clone());

        assert!(evaluator.check_model("Claude-3-Opus").is_err());
        let result = evaluator.evaluate_pair("Claude-3-Opus", "q", "a", "").await;
        assert!(!result.is_success());
        assert!(mock.prompts().is_empty());
    }
}

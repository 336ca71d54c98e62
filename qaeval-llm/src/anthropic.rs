//! Anthropic messages API client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LlmError;
use crate::provider::{ChatProvider, CompletionOptions, ProviderKind};

const PROVIDER: &str = "Anthropic";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    http: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicProvider {
    pub fn new(http: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.base_url)
    }
}

/// Concatenate the text blocks of a reply.
fn reply_text(response: MessagesResponse) -> Result<String, LlmError> {
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .map(|block| block.text)
        .collect();
    if text.is_empty() {
        return Err(LlmError::EmptyCompletion { provider: PROVIDER });
    }
    Ok(text)
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        debug!(model, prompt_chars = prompt.len(), "anthropic message");

        let request = MessagesRequest {
            model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::api(PROVIDER, status, &body));
        }

        reply_text(response.json::<MessagesResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_text_blocks() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "```json\n{"},
                {"type": "tool_use", "id": "t", "name": "x", "input": {}},
                {"type": "text", "text": "}\n```"}
            ]
        }))
        .unwrap();
        assert_eq!(reply_text(response).unwrap(), "```json\n{}\n```");
    }

    #[test]
    fn no_text_is_an_error() {
        let response: MessagesResponse =
            serde_json::from_value(json!({"content": []})).unwrap();
        assert!(matches!(
            reply_text(response),
            Err(LlmError::EmptyCompletion { provider: "Anthropic" })
        ));
    }

    #[test]
    fn endpoint_uses_messages_path() {
        let provider = AnthropicProvider::new(Client::new(), "k", "https://api.anthropic.com/v1");
        assert_eq!(provider.endpoint(), "https://api.anthropic.com/v1/messages");
    }
}

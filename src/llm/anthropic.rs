//! Anthropic Messages API provider.

use super::provider::{CompletionOptions, LlmError, LlmProvider};
use super::types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};
use crate::credentials::ApiKey;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Value sent in the `anthropic-version` header.
const API_VERSION: &str = "2023-06-01";

/// Provider for the Anthropic Messages API (`POST /v1/messages`).
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    /// Create a new provider.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://api.anthropic.com").
    /// * `model` - Model to use (e.g., "claude-sonnet-4-20250514").
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn to_anthropic_messages(messages: &[Message]) -> Vec<AnthropicMessage> {
        messages.iter().map(|m| m.into()).collect()
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        api_key: &ApiKey,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);

        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            messages: Self::to_anthropic_messages(messages),
        };

        debug!(
            model = %self.model,
            message_count = messages.len(),
            max_tokens = options.max_tokens,
            "Sending completion request to Anthropic"
        );

        let mut req_builder = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose())
            .header("anthropic-version", API_VERSION)
            .json(&request);

        if let Some(timeout) = options.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let anthropic_response: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::InvalidResponse(format!("Failed to parse Anthropic response: {}", e))
        })?;

        anthropic_response.into_completion()
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

impl From<&Message> for AnthropicMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        AnthropicMessage {
            role,
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    fn into_completion(self) -> Result<CompletionResponse, LlmError> {
        let text = self
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                LlmError::InvalidResponse("No text content in Anthropic response".to_string())
            })?;

        let finish_reason = match self.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") | None => FinishReason::Stop,
            Some("max_tokens") => FinishReason::MaxTokens,
            Some(_) => FinishReason::Other,
        };

        debug!(
            finish_reason = ?finish_reason,
            text_len = text.len(),
            "Received completion response from Anthropic"
        );

        Ok(CompletionResponse {
            message: Message::assistant(text),
            finish_reason,
            usage: self.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = AnthropicRequest {
            model: "claude-test".to_string(),
            max_tokens: 200,
            temperature: Some(1.0),
            messages: AnthropicProvider::to_anthropic_messages(&[Message::user("Hi")]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "claude-test");
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hi");

        let request = AnthropicRequest {
            temperature: None,
            ..request
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_first_text_block_is_used() {
        let response: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Truck Bed Sunrise"},
                {"type": "text", "text": "ignored"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 4}
        }))
        .unwrap();

        let completion = response.into_completion().unwrap();
        assert_eq!(completion.text(), "Truck Bed Sunrise");
        assert_eq!(completion.finish_reason, FinishReason::Stop);
        assert_eq!(completion.usage.unwrap().output_tokens, 4);
    }

    #[test]
    fn test_missing_text_block_is_invalid() {
        let response: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [],
            "stop_reason": "max_tokens"
        }))
        .unwrap();

        assert!(matches!(
            response.into_completion(),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider = AnthropicProvider::new("https://api.anthropic.com/", "m");
        assert_eq!(provider.base_url, "https://api.anthropic.com");
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.model(), "m");
    }
}

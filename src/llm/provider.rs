//! LLM provider trait definition.

use super::types::{CompletionResponse, Message};
use crate::credentials::ApiKey;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Options for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Sampling temperature. `None` leaves the provider default in place.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: None,
            max_tokens: 1024,
            timeout: None,
        }
    }
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timeout")]
    Timeout,
}

/// Trait for LLM providers.
///
/// The API key is passed on every call rather than stored in the provider,
/// so the same provider instance serves whatever credential the request
/// carries.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider's name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Complete a conversation.
    ///
    /// # Arguments
    /// * `api_key` - Credential for this single call.
    /// * `messages` - The conversation history.
    /// * `options` - Completion options (token budget, temperature, timeout).
    async fn complete(
        &self,
        api_key: &ApiKey,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError>;
}

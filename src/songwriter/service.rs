use super::models::{GenerationRequest, SongRecord};
use super::normalizer::ResponseNormalizer;
use super::prompts::{hook_prompt, song_prompt, HookIngredients};
use super::style::StyleLevel;
use crate::credentials::ApiKey;
use crate::llm::{CompletionOptions, LlmError, LlmProvider, Message};
use crate::server::metrics;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

pub const HOOK_MAX_TOKENS: u32 = 200;
pub const HOOK_TEMPERATURE: f32 = 1.0;
pub const SONG_MAX_TOKENS: u32 = 4000;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No API key configured")]
    MissingCredential,

    #[error("Theme is required")]
    MissingTheme,

    #[error("Upstream generation failed: {0}")]
    Upstream(#[from] LlmError),
}

impl GenerationError {
    fn outcome_label(&self) -> &'static str {
        match self {
            GenerationError::MissingCredential => "missing_credential",
            GenerationError::MissingTheme => "invalid_request",
            GenerationError::Upstream(_) => "upstream_error",
        }
    }
}

/// Turns generation parameters into prompts, sends them upstream and
/// normalizes the replies.
pub struct Songwriter {
    provider: Arc<dyn LlmProvider>,
    normalizer: ResponseNormalizer,
    request_timeout: Option<Duration>,
}

impl Songwriter {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            normalizer: ResponseNormalizer::default(),
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Asks for a single hook phrase.
    pub async fn generate_hook(
        &self,
        api_key: Option<&ApiKey>,
        level: StyleLevel,
        ingredients: &HookIngredients,
    ) -> Result<String, GenerationError> {
        let result = self.generate_hook_inner(api_key, level, ingredients).await;
        record_outcome("hook", &result);
        result
    }

    async fn generate_hook_inner(
        &self,
        api_key: Option<&ApiKey>,
        level: StyleLevel,
        ingredients: &HookIngredients,
    ) -> Result<String, GenerationError> {
        let api_key = api_key.ok_or(GenerationError::MissingCredential)?;

        debug!(
            level = level.value(),
            band = %level.band(),
            seed = ingredients.seed,
            "Generating hook"
        );
        let prompt = hook_prompt(level, ingredients);
        let options = CompletionOptions {
            temperature: Some(HOOK_TEMPERATURE),
            max_tokens: HOOK_MAX_TOKENS,
            timeout: self.request_timeout,
        };

        let text = self.complete("hook", api_key, prompt, &options).await?;
        Ok(text.trim().to_string())
    }

    /// Asks for a full song and normalizes the reply into a [`SongRecord`].
    pub async fn generate_song(
        &self,
        api_key: Option<&ApiKey>,
        request: &GenerationRequest,
    ) -> Result<SongRecord, GenerationError> {
        let result = self.generate_song_inner(api_key, request).await;
        record_outcome("song", &result);
        result
    }

    async fn generate_song_inner(
        &self,
        api_key: Option<&ApiKey>,
        request: &GenerationRequest,
    ) -> Result<SongRecord, GenerationError> {
        let api_key = api_key.ok_or(GenerationError::MissingCredential)?;
        if !request.has_theme() {
            return Err(GenerationError::MissingTheme);
        }

        info!(
            theme = %request.theme,
            level = request.style_level.value(),
            band = %request.style_level.band(),
            "Generating song"
        );
        let prompt = song_prompt(request);
        let options = CompletionOptions {
            temperature: None,
            max_tokens: SONG_MAX_TOKENS,
            timeout: self.request_timeout,
        };

        let text = self.complete("song", api_key, prompt, &options).await?;
        debug!(raw = %text, "Raw song response");

        let (record, strategy) = self.normalizer.normalize_with_strategy(&text);
        metrics::record_normalizer_strategy(strategy);
        Ok(record)
    }

    async fn complete(
        &self,
        kind: &'static str,
        api_key: &ApiKey,
        prompt: String,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let start = Instant::now();
        let result = self
            .provider
            .complete(api_key, &[Message::user(prompt)], options)
            .await;
        metrics::record_llm_request(kind, start.elapsed());

        match result {
            Ok(response) => {
                if let Some(usage) = response.usage {
                    debug!(
                        kind,
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        finish_reason = ?response.finish_reason,
                        "Completion finished"
                    );
                }
                Ok(response.message.content)
            }
            Err(e) => {
                error!(kind, provider = self.provider.name(), "Generation failed: {}", e);
                Err(e)
            }
        }
    }
}

fn record_outcome<T>(kind: &str, result: &Result<T, GenerationError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.outcome_label(),
    };
    metrics::record_generation(kind, outcome);
}

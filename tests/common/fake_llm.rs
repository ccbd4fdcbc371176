//! In-process LLM provider test double
//!
//! Answers from a script and records every call, so tests can assert both on
//! what was sent upstream and on the absence of upstream calls.

#![allow(dead_code)]

use async_trait::async_trait;
use songsmith_server::credentials::ApiKey;
use songsmith_server::llm::{
    CompletionOptions, CompletionResponse, FinishReason, LlmError, LlmProvider, Message,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded upstream call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub api_key: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

enum Reply {
    Text(String),
    Status(u16),
}

pub struct FakeLlmProvider {
    queued: Mutex<VecDeque<Reply>>,
    fallback: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeLlmProvider {
    /// Answers `fallback` whenever nothing is queued.
    pub fn new(fallback: &str) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: fallback.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, text: &str) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Reply::Text(text.to_string()));
    }

    /// Makes the next call fail with an upstream API error.
    pub fn queue_failure(&self, status: u16) {
        self.queued.lock().unwrap().push_back(Reply::Status(status));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for FakeLlmProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(
        &self,
        api_key: &ApiKey,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            api_key: api_key.expose().to_string(),
            prompt: messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        });

        let reply = self
            .queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Text(self.fallback.clone()));

        match reply {
            Reply::Text(text) => Ok(CompletionResponse {
                message: Message::assistant(text),
                finish_reason: FinishReason::Stop,
                usage: None,
            }),
            Reply::Status(status) => Err(LlmError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

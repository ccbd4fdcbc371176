//! LLM provider abstraction layer.
//!
//! This module provides a trait-based abstraction for LLM providers so the
//! songwriter can be exercised against a test double instead of the network.

mod anthropic;
mod provider;
mod types;

pub use anthropic::AnthropicProvider;
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};

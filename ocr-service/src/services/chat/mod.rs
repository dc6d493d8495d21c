//! Chat-completion provider abstractions.
//!
//! The table formatter only needs "messages in, reply text out", so that is
//! the whole [`ChatProvider`] surface. [`GroqChatProvider`] speaks the
//! OpenAI-compatible wire format and works against any endpoint that does.

pub mod groq;
pub mod mock;

pub use groq::GroqChatProvider;
pub use mock::MockChatProvider;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters for a completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionParams {
    pub temperature: Option<f32>,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Stable provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Model identifier requests are sent with.
    fn model(&self) -> &str;

    /// Run one completion and return the first choice's message content.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, ProviderError>;
}

//! Text-to-table formatting through a chat-completion model.

use crate::services::chat::{ChatMessage, ChatProvider, CompletionParams, ProviderError};
use metrics::counter;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub const SYSTEM_PROMPT: &str = "You are a text-to-table formatter.";

/// Low temperature keeps the reply close to plain JSON.
pub const FORMAT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Model reply is not valid JSON: {0}")]
    InvalidTable(#[from] serde_json::Error),
}

impl FormatError {
    pub fn kind(&self) -> &'static str {
        match self {
            FormatError::Provider(ProviderError::NotConfigured(_)) => "not_configured",
            FormatError::Provider(ProviderError::RateLimited(_)) => "rate_limited",
            FormatError::Provider(ProviderError::NetworkError(_)) => "network",
            FormatError::Provider(_) => "provider",
            FormatError::InvalidTable(_) => "invalid_table",
        }
    }
}

/// Build the user message asking the model for a JSON array of rows.
pub fn build_prompt(text: &str) -> String {
    format!(
        "You are a helpful assistant. Convert the following unstructured text into a JSON array \
         representing rows of a table. Each row should be a list of cells. Don't explain. Text:\n\
         \"\"\"\n{}\n\"\"\"\n\n\
         Respond with only a JSON array like:\n\
         [[\"Header1\", \"Header2\"], [\"Row1Col1\", \"Row1Col2\"]]",
        text
    )
}

#[derive(Clone)]
pub struct TableFormatter {
    provider: Arc<dyn ChatProvider>,
}

impl TableFormatter {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Ask the model to tabulate `text` and parse its reply as JSON.
    ///
    /// The parsed value is returned as-is; no row/column shape is enforced.
    pub async fn format(&self, text: &str) -> Result<Value, FormatError> {
        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(build_prompt(text))];
        let params = CompletionParams {
            temperature: Some(FORMAT_TEMPERATURE),
        };

        let result = self
            .provider
            .complete(&messages, &params)
            .await
            .map_err(FormatError::from)
            .and_then(|reply| serde_json::from_str::<Value>(reply.trim()).map_err(FormatError::from));

        match &result {
            Ok(_) => {
                counter!("table_format_requests_total", "outcome" => "ok").increment(1);
                tracing::info!(
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    text_len = text.len(),
                    "Text formatted into table"
                );
            }
            Err(e) => {
                counter!("table_format_requests_total", "outcome" => e.kind()).increment(1);
                tracing::error!(
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    error_kind = e.kind(),
                    error = %e,
                    "Table formatting failed"
                );
            }
        }

        result
    }
}

//! OpenAI-compatible chat-completion provider (Groq by default).

use super::{ChatMessage, ChatProvider, CompletionParams, ProviderError};
use crate::config::ChatConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;

pub struct GroqChatProvider {
    config: ChatConfig,
    client: Client,
}

impl GroqChatProvider {
    pub fn new(config: ChatConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl ChatProvider for GroqChatProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, ProviderError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "chat completion API key not configured".to_string(),
            ));
        }

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: params.temperature,
        };

        tracing::debug!(
            model = %self.config.model,
            message_count = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .traced_post(&self.config.api_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited(error_text));
            }

            return Err(ProviderError::ApiError(format!(
                "chat completion API returned {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                model = %self.config.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("response contained no choices".to_string()))?
            .message
            .content
            .ok_or_else(|| ProviderError::InvalidResponse("first choice has no content".to_string()))
    }
}

// ============================================================================
// OpenAI-compatible Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::chat::ChatRole;

    #[test]
    fn request_serializes_in_openai_shape() {
        let messages = vec![
            ChatMessage::system("You are a text-to-table formatter."),
            ChatMessage::user("hi"),
        ];
        let request = ChatCompletionRequest {
            model: "llama3-8b-8192",
            messages: &messages,
            temperature: Some(0.3),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama3-8b-8192");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert!((value["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(value.as_object().unwrap().len(), 3);
        assert_eq!(messages[1].role, ChatRole::User);
    }

    #[test]
    fn response_tolerates_missing_usage() {
        let completion: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"[[\"a\"]]"}}]}"#,
        )
        .unwrap();

        assert!(completion.usage.is_none());
        assert_eq!(
            completion.choices[0].message.content.as_deref(),
            Some("[[\"a\"]]")
        );
    }
}

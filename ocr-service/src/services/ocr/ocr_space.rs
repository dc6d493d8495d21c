//! OCR.space hosted OCR backend.
//!
//! Uploads the image as multipart form data to `/parse/image` and reads the
//! first `ParsedText` from the reply.

use super::{OcrBackend, OcrError};
use crate::config::OcrSpaceConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use service_core::observability::TracedClientExt;

/// File name reported for the uploaded part; OCR.space sniffs the real type.
const UPLOAD_FILE_NAME: &str = "image.jpg";

pub struct OcrSpaceBackend {
    config: OcrSpaceConfig,
    client: Client,
}

impl OcrSpaceBackend {
    pub fn new(config: OcrSpaceConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn build_form(&self, image: &[u8]) -> Form {
        let file = Part::bytes(image.to_vec()).file_name(UPLOAD_FILE_NAME);

        Form::new()
            .part("file", file)
            .text("apikey", self.config.api_key.expose_secret().clone())
            .text("language", self.config.language.clone())
            .text("OCREngine", self.config.engine.clone())
            .text("isOverlayRequired", "False")
    }
}

#[async_trait]
impl OcrBackend for OcrSpaceBackend {
    fn name(&self) -> &'static str {
        "ocr_space"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        tracing::debug!(
            url = %self.config.api_url,
            image_size = image.len(),
            engine = %self.config.engine,
            "Sending image to OCR.space"
        );

        let response = self
            .client
            .traced_post(&self.config.api_url)
            .multipart(self.build_form(image))
            .send()
            .await
            .map_err(|e| OcrError::Network(e.to_string()))?;

        // OCR.space reports most failures in the JSON body, so the status code
        // is only logged.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OcrError::Network(e.to_string()))?;

        tracing::debug!(status = %status, body_len = body.len(), "OCR.space response");

        parse_response(&body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: Option<bool>,
    /// A string or an array of strings depending on the failure.
    #[serde(default)]
    error_message: Option<serde_json::Value>,
    #[serde(default)]
    error_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
}

fn parse_response(body: &str) -> Result<String, OcrError> {
    let response: OcrSpaceResponse = serde_json::from_str(body)
        .map_err(|e| OcrError::MalformedResponse(format!("{}: {}", e, truncate(body, 200))))?;

    if response.is_errored_on_processing == Some(true) {
        let message = response
            .error_message
            .as_ref()
            .or(response.error_details.as_ref())
            .map(flatten_message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(OcrError::Provider(message));
    }

    let text = response
        .parsed_results
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|r| r.parsed_text)
        .unwrap_or_default();

    Ok(text.trim().to_string())
}

fn flatten_message(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(flatten_message)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

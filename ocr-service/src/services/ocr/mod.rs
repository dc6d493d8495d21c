//! OCR backends and the relay that fronts them.
//!
//! Every engine implements [`OcrBackend`] (image bytes in, text out); the
//! server picks one at startup from `OCR_BACKEND` and shares it across
//! requests through [`OcrRelay`].

pub mod mock;
pub mod ocr_space;
pub mod tesseract;

pub use mock::MockOcrBackend;
pub use ocr_space::OcrSpaceBackend;
pub use tesseract::TesseractBackend;

use crate::services::executor::CommandError;
use crate::services::payload::{decode_image_payload, PayloadError};
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Unsupported or corrupt image: {0}")]
    InvalidImage(String),

    #[error("OCR provider reported an error: {0}")]
    Provider(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed OCR response: {0}")]
    MalformedResponse(String),

    #[error("OCR engine failed: {0}")]
    Engine(#[from] CommandError),

    #[error("OCR task aborted: {0}")]
    Aborted(String),
}

impl OcrError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OcrError::Payload(_) => "payload",
            OcrError::InvalidImage(_) => "invalid_image",
            OcrError::Provider(_) => "provider",
            OcrError::Network(_) => "network",
            OcrError::MalformedResponse(_) => "malformed_response",
            OcrError::Engine(_) => "engine",
            OcrError::Aborted(_) => "aborted",
        }
    }
}

/// An engine that turns an encoded image into text.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Stable backend name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Recognize the text in `image` (PNG, JPEG, ...).
    ///
    /// `Ok("")` means the engine ran and found nothing.
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Join recognized fragments with single spaces, flatten newlines and trim.
pub fn join_fragments<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = fragments
        .into_iter()
        .map(|f| f.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ");

    joined.replace('\n', " ").trim().to_string()
}

/// Image-to-text relay used by `/api/extract-text`.
///
/// Failures never escape: a malformed payload, a provider error flag, or an
/// engine crash all come back as an empty string, which clients treat the
/// same as "no text found". The reason is logged so operators can still tell
/// the two apart.
#[derive(Clone)]
pub struct OcrRelay {
    backend: Arc<dyn OcrBackend>,
}

impl OcrRelay {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Extract text from a base64 (or data-URI) image payload.
    pub async fn extract_text(&self, payload: &str) -> String {
        let backend = self.backend.name();

        match self.try_extract_text(payload).await {
            Ok(text) => {
                let outcome = if text.is_empty() { "empty" } else { "ok" };
                counter!("ocr_requests_total", "backend" => backend, "outcome" => outcome)
                    .increment(1);
                tracing::info!(backend, text_len = text.len(), "OCR extraction complete");
                text
            }
            Err(e) => {
                counter!("ocr_requests_total", "backend" => backend, "outcome" => "error")
                    .increment(1);
                tracing::warn!(
                    backend,
                    error_kind = e.kind(),
                    error = %e,
                    "OCR extraction failed, returning empty text"
                );
                String::new()
            }
        }
    }

    /// Like [`OcrRelay::extract_text`] but keeps the failure.
    pub async fn try_extract_text(&self, payload: &str) -> Result<String, OcrError> {
        let image = decode_image_payload(payload)?;

        tracing::debug!(
            backend = self.backend.name(),
            image_size = image.len(),
            "Decoded image payload"
        );

        self.backend.recognize(&image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "aGVsbG8gd29ybGQ=";

    #[test]
    fn fragments_are_space_joined_and_flattened() {
        assert_eq!(join_fragments(["Name", "Age"]), "Name Age");
        assert_eq!(join_fragments(["  Total:\n", "42 \n"]), "Total:  42");
        assert_eq!(join_fragments(Vec::<String>::new()), "");
    }

    #[tokio::test]
    async fn relay_returns_backend_text() {
        let relay = OcrRelay::new(Arc::new(MockOcrBackend::with_text("Invoice 42")));
        assert_eq!(relay.extract_text(PAYLOAD).await, "Invoice 42");
    }

    #[tokio::test]
    async fn relay_treats_prefixed_and_bare_payloads_alike() {
        let backend = Arc::new(MockOcrBackend::echo_size());
        let relay = OcrRelay::new(backend.clone());

        let bare = relay.extract_text(PAYLOAD).await;
        let prefixed = relay
            .extract_text(&format!("data:image/png;base64,{}", PAYLOAD))
            .await;

        assert_eq!(bare, prefixed);
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn relay_swallows_backend_errors() {
        let relay = OcrRelay::new(Arc::new(MockOcrBackend::failing("quota exceeded")));

        assert_eq!(relay.extract_text(PAYLOAD).await, "");

        let err = relay.try_extract_text(PAYLOAD).await.unwrap_err();
        assert!(matches!(err, OcrError::Provider(ref msg) if msg == "quota exceeded"));
    }

    #[tokio::test]
    async fn relay_swallows_bad_payloads_without_calling_backend() {
        let backend = Arc::new(MockOcrBackend::with_text("unused"));
        let relay = OcrRelay::new(backend.clone());

        assert_eq!(relay.extract_text("%%%").await, "");
        assert_eq!(relay.extract_text("data:image/png").await, "");
        assert_eq!(backend.call_count(), 0);
    }
}

//! Mock OCR backend for tests and offline development.

use super::{OcrBackend, OcrError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

enum MockReply {
    Text(String),
    EchoSize,
    Fail(String),
}

pub struct MockOcrBackend {
    reply: MockReply,
    call_count: AtomicU64,
}

impl MockOcrBackend {
    /// Always recognize `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(MockReply::Text(text.into()))
    }

    /// Report how many bytes it was given, e.g. `mock text (1024 bytes)`.
    pub fn echo_size() -> Self {
        Self::new(MockReply::EchoSize)
    }

    /// Fail every call as if the provider flagged an error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockReply::Fail(message.into()))
    }

    fn new(reply: MockReply) -> Self {
        Self {
            reply,
            call_count: AtomicU64::new(0),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrBackend for MockOcrBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        tracing::info!(image_size = image.len(), "[MOCK] OCR would run");

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::EchoSize => Ok(format!("mock text ({} bytes)", image.len())),
            MockReply::Fail(message) => Err(OcrError::Provider(message.clone())),
        }
    }
}

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ocr_service::config::{ChatConfig, CorsConfig, OcrSpaceConfig, RequestLimitsConfig};
use ocr_service::services::{
    ChatProvider, GroqChatProvider, MockChatProvider, MockOcrBackend, OcrBackend, OcrSpaceBackend,
};
use ocr_service::startup::{build_router, AppState};
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_OCR_KEY: &str = "test-ocr-key";
pub const TEST_CHAT_KEY: &str = "test-chat-key";
pub const TEST_CHAT_MODEL: &str = "llama3-8b-8192";

/// A 1x1 PNG, base64 encoded.
pub const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

pub fn ocr_space_config(server_uri: &str) -> OcrSpaceConfig {
    OcrSpaceConfig {
        api_url: format!("{}/parse/image", server_uri),
        api_key: Secret::new(TEST_OCR_KEY.to_string()),
        language: "eng".to_string(),
        engine: "2".to_string(),
    }
}

pub fn chat_config(server_uri: &str) -> ChatConfig {
    ChatConfig {
        api_url: format!("{}/openai/v1/chat/completions", server_uri),
        api_key: Secret::new(TEST_CHAT_KEY.to_string()),
        model: TEST_CHAT_MODEL.to_string(),
    }
}

pub fn ocr_space_backend(server_uri: &str) -> Arc<dyn OcrBackend> {
    Arc::new(OcrSpaceBackend::new(
        ocr_space_config(server_uri),
        reqwest::Client::new(),
    ))
}

pub fn groq_provider(server_uri: &str) -> Arc<dyn ChatProvider> {
    Arc::new(GroqChatProvider::new(
        chat_config(server_uri),
        reqwest::Client::new(),
    ))
}

/// Router backed by the given engines.
pub fn router_with(ocr: Arc<dyn OcrBackend>, chat: Arc<dyn ChatProvider>) -> Router {
    router_with_limit(ocr, chat, RequestLimitsConfig::default().max_body_bytes)
}

/// Like [`router_with`] but with a custom request body limit.
pub fn router_with_limit(
    ocr: Arc<dyn OcrBackend>,
    chat: Arc<dyn ChatProvider>,
    max_body_bytes: usize,
) -> Router {
    build_router(
        AppState::new(ocr, chat),
        &CorsConfig::default(),
        &RequestLimitsConfig { max_body_bytes },
    )
}

/// Router backed by mocks that should never be reached.
pub fn mock_router() -> Router {
    router_with(
        Arc::new(MockOcrBackend::with_text("mock text")),
        Arc::new(MockChatProvider::replying("[]")),
    )
}

pub async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(router, request).await
}

pub async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

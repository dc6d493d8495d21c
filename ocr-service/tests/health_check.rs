mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{get, mock_router};
use ocr_service::config::{
    ChatConfig, CorsConfig, HttpClientConfig, OcrBackendKind, OcrConfig, OcrServiceConfig,
    OcrSpaceConfig, RequestLimitsConfig, TesseractConfig,
};
use ocr_service::startup::Application;
use secrecy::Secret;
use serde_json::json;
use service_core::config::Config;
use tower::ServiceExt;

#[tokio::test]
async fn health_check_works() {
    let (status, body) = get(mock_router(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = mock_router().oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn cors_preflight_is_allowed_from_any_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/format-text")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = mock_router().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, _) = get(mock_router(), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn application_serves_over_tcp() {
    let config = OcrServiceConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "info".to_string(),
        },
        ocr: OcrConfig {
            backend: OcrBackendKind::Mock,
            ocr_space: OcrSpaceConfig {
                api_url: "http://127.0.0.1:9/parse/image".to_string(),
                api_key: Secret::new("unused".to_string()),
                language: "eng".to_string(),
                engine: "2".to_string(),
            },
            tesseract: TesseractConfig::default(),
        },
        chat: ChatConfig {
            api_url: "http://127.0.0.1:9/chat/completions".to_string(),
            api_key: Secret::new("unused".to_string()),
            model: "test-model".to_string(),
        },
        http_client: HttpClientConfig { timeout_secs: 5 },
        cors: CorsConfig::default(),
        limits: RequestLimitsConfig::default(),
        otlp_endpoint: None,
    };

    let app = Application::build(config)
        .await
        .expect("Failed to build test application");
    let address = format!("http://127.0.0.1:{}", app.http_port());

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/api/extract-text", address))
        .json(&json!({ "image": "data:image/png;base64,aGVsbG8=" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "success": true, "text": "mock text (5 bytes)" }));
}

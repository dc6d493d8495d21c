//! Application startup and lifecycle management.

use crate::config::{
    CorsConfig, OcrBackendKind, OcrConfig, OcrServiceConfig, RequestLimitsConfig,
};
use crate::handlers::{extract, format, health, metrics, panic_response};
use crate::services::{
    ChatProvider, GroqChatProvider, MockOcrBackend, OcrBackend, OcrRelay, OcrSpaceBackend,
    TableFormatter, TesseractBackend,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use service_core::observability::REQUEST_ID_HEADER;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub ocr: OcrRelay,
    pub formatter: TableFormatter,
}

impl AppState {
    pub fn new(ocr_backend: Arc<dyn OcrBackend>, chat_provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            ocr: OcrRelay::new(ocr_backend),
            formatter: TableFormatter::new(chat_provider),
        }
    }
}

/// Construct the OCR engine selected by configuration.
pub fn build_ocr_backend(config: &OcrConfig, client: reqwest::Client) -> Arc<dyn OcrBackend> {
    match config.backend {
        OcrBackendKind::OcrSpace => {
            Arc::new(OcrSpaceBackend::new(config.ocr_space.clone(), client))
        }
        OcrBackendKind::Tesseract => Arc::new(TesseractBackend::new(config.tesseract.clone())),
        OcrBackendKind::Mock => {
            tracing::warn!("Using mock OCR backend; extracted text is synthetic");
            Arc::new(MockOcrBackend::echo_size())
        }
    }
}

fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    if cors.allows_any() {
        return layer.allow_origin(Any);
    }

    let origins = cors
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    layer.allow_origin(origins)
}

pub fn build_router(state: AppState, cors: &CorsConfig, limits: &RequestLimitsConfig) -> Router {
    Router::new()
        .route("/api/extract-text", post(extract::extract_text))
        .route("/api/format-text", post(format::format_text))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics))
        .with_state(state)
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(build_cors_layer(cors))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: OcrServiceConfig) -> Result<Self, AppError> {
        // One client for every upstream call so connections are pooled.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_client.timeout_secs))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                AppError::InternalError(e.into())
            })?;

        let ocr_backend = build_ocr_backend(&config.ocr, client.clone());
        let chat_provider: Arc<dyn ChatProvider> =
            Arc::new(GroqChatProvider::new(config.chat.clone(), client));

        tracing::info!(
            ocr_backend = ocr_backend.name(),
            chat_model = %config.chat.model,
            max_body_bytes = config.limits.max_body_bytes,
            "Initialized providers"
        );

        let router = build_router(
            AppState::new(ocr_backend, chat_provider),
            &config.cors,
            &config.limits,
        );

        // Port 0 binds a random port, used by tests.
        let addr = config.common.bind_address();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "OCR service listening");

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

use crate::dtos::HealthResponse;
use axum::Json;

/// Liveness only; upstream OCR and chat services are not contacted.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

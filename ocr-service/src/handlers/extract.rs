use super::{body_field, RelayError};
use crate::dtos::ExtractTextResponse;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use service_core::error::AppError;

/// POST /api/extract-text
///
/// `{"image": "<base64 or data URI>"}` -> `{"success": true, "text": "..."}`.
/// OCR failures come back as empty text, never as an error status.
pub async fn extract_text(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ExtractTextResponse>, Response> {
    let body = body.map_err(|e| RelayError::from(e).into_response())?;

    let text = match body_field(&body, "image") {
        None => {
            return Err(AppError::bad_request("No image data provided").into_response());
        }
        Some(Value::String(payload)) => state.ocr.extract_text(&payload).await,
        Some(other) => {
            tracing::warn!(
                backend = state.ocr.backend_name(),
                image_type = json_type(&other),
                "Image field is not a string, returning empty text"
            );
            String::new()
        }
    };

    Ok(Json(ExtractTextResponse {
        success: true,
        text,
    }))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use super::{body_field, RelayError};
use crate::dtos::FormatTextResponse;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use serde_json::Value;

/// POST /api/format-text
///
/// `{"text": "..."}` -> `{"success": true, "table": [[...], ...]}`.
pub async fn format_text(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<FormatTextResponse>, RelayError> {
    let body = body?;

    let text = match body_field(&body, "text") {
        None => return Err(RelayError::MissingField("Text not provided")),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    };

    let table = state
        .formatter
        .format(&text)
        .await
        .map_err(|e| RelayError::Internal(e.to_string()))?;

    Ok(Json(FormatTextResponse {
        success: true,
        table,
    }))
}

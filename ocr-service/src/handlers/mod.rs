pub mod extract;
pub mod format;
pub mod health;
pub mod metrics;

use crate::dtos::RelayErrorResponse;
use axum::{
    body::{Body, Bytes},
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::any::Any;
use thiserror::Error;

/// Errors rendered as `{"success": false, "error": "..."}`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Internal(String),

    /// The body could not be read, e.g. it exceeds the size limit.
    #[error("{}", .0.body_text())]
    UnreadableBody(#[from] BytesRejection),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::MissingField(_) => StatusCode::BAD_REQUEST,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::UnreadableBody(rejection) => rejection.status(),
        };

        if let RelayError::UnreadableBody(rejection) = &self {
            tracing::warn!(status = %status, error = %rejection, "Rejected request body");
        }

        (
            status,
            Json(RelayErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Look up `name` in a JSON object body.
///
/// A body that is not JSON, or not an object, has no fields.
pub(crate) fn body_field(body: &Bytes, name: &str) -> Option<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut map)) => map.remove(name),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not JSON");
            None
        }
    }
}

/// Render a handler panic as a 500 relay error.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    tracing::error!(panic = %message, "Handler panicked");

    RelayError::Internal(message).into_response()
}

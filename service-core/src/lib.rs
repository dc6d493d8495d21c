//! service-core: Shared infrastructure for the OCR relay services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use reqwest;
pub use serde_json;
pub use tokio;
pub use tracing;

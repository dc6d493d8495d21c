use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractTextResponse {
    pub success: bool,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormatTextResponse {
    pub success: bool,
    pub table: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelayErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

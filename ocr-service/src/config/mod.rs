use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

const DEFAULT_OCR_SPACE_API_URL: &str = "https://api.ocr.space/parse/image";
/// OCR.space's public demo key; rate limited, fine for local development only.
const DEFAULT_OCR_SPACE_API_KEY: &str = "helloworld";
const DEFAULT_CHAT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_CHAT_MODEL: &str = "llama3-8b-8192";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;
const DEFAULT_TESSERACT_TIMEOUT_SECS: u64 = 60;
/// Base64 inflates images by a third, so this admits photos of roughly 18 MB.
const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct OcrServiceConfig {
    pub common: core_config::Config,
    pub ocr: OcrConfig,
    pub chat: ChatConfig,
    pub http_client: HttpClientConfig,
    pub cors: CorsConfig,
    pub limits: RequestLimitsConfig,
    /// OTLP collector endpoint; span export is off when unset.
    pub otlp_endpoint: Option<String>,
}

/// Which engine answers `/api/extract-text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrBackendKind {
    OcrSpace,
    Tesseract,
    Mock,
}

impl OcrBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendKind::OcrSpace => "ocr_space",
            OcrBackendKind::Tesseract => "tesseract",
            OcrBackendKind::Mock => "mock",
        }
    }
}

impl fmt::Display for OcrBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OcrBackendKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ocr_space" | "ocrspace" | "hosted" => Ok(OcrBackendKind::OcrSpace),
            "tesseract" | "local" => Ok(OcrBackendKind::Tesseract),
            "mock" => Ok(OcrBackendKind::Mock),
            other => Err(AppError::config(format!(
                "OCR_BACKEND must be one of ocr_space, tesseract, mock (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub backend: OcrBackendKind,
    pub ocr_space: OcrSpaceConfig,
    pub tesseract: TesseractConfig,
}

#[derive(Debug, Clone)]
pub struct OcrSpaceConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    /// OCR.space language code, e.g. `eng`.
    pub language: String,
    /// OCR.space engine version (`1` or `2`).
    pub engine: String,
}

#[derive(Debug, Clone)]
pub struct TesseractConfig {
    pub binary: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            timeout_secs: DEFAULT_TESSERACT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Full URL of an OpenAI-compatible `/chat/completions` endpoint.
    pub api_url: String,
    pub api_key: Secret<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct RequestLimitsConfig {
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for RequestLimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl OcrServiceConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: OcrBackendKind = get_env("OCR_BACKEND", Some("ocr_space"), is_prod)?.parse()?;

        // In production only the selected backend's settings are mandatory.
        let ocr_space_required = is_prod && backend == OcrBackendKind::OcrSpace;
        let tesseract_required = is_prod && backend == OcrBackendKind::Tesseract;

        Ok(OcrServiceConfig {
            common: common_config,
            ocr: OcrConfig {
                backend,
                ocr_space: OcrSpaceConfig {
                    api_url: get_env(
                        "OCR_SPACE_API_URL",
                        Some(DEFAULT_OCR_SPACE_API_URL),
                        ocr_space_required,
                    )?,
                    api_key: Secret::new(get_env(
                        "OCR_SPACE_API_KEY",
                        Some(DEFAULT_OCR_SPACE_API_KEY),
                        ocr_space_required,
                    )?),
                    language: get_env("OCR_SPACE_LANGUAGE", Some("eng"), ocr_space_required)?,
                    engine: get_env("OCR_SPACE_ENGINE", Some("2"), ocr_space_required)?,
                },
                tesseract: TesseractConfig {
                    binary: get_env("TESSERACT_BINARY", Some("tesseract"), tesseract_required)?,
                    language: get_env("TESSERACT_LANGUAGE", Some("eng"), tesseract_required)?,
                    timeout_secs: parse_setting(
                        "TESSERACT_TIMEOUT_SECS",
                        &get_env(
                            "TESSERACT_TIMEOUT_SECS",
                            Some(&DEFAULT_TESSERACT_TIMEOUT_SECS.to_string()),
                            tesseract_required,
                        )?,
                    )?,
                },
            },
            chat: ChatConfig {
                api_url: get_env("CHAT_API_URL", Some(DEFAULT_CHAT_API_URL), is_prod)?,
                api_key: Secret::new(get_env("CHAT_API_KEY", None, is_prod)?),
                model: get_env("CHAT_MODEL", Some(DEFAULT_CHAT_MODEL), is_prod)?,
            },
            http_client: HttpClientConfig {
                timeout_secs: optional_setting(
                    "HTTP_CLIENT_TIMEOUT_SECS",
                    DEFAULT_HTTP_TIMEOUT_SECS,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(
                    &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
                ),
            },
            limits: RequestLimitsConfig {
                max_body_bytes: optional_setting("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

/// Parse `raw` as the value of `key`; malformed numbers are config errors.
fn parse_setting<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::config(format!("{} has invalid value '{}': {}", key, raw, e)))
}

/// `key` parsed from the environment, or `default` when unset.
fn optional_setting<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_setting(key, &raw),
        Err(_) => Ok(default),
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

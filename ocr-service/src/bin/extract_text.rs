//! Run local OCR on one image file and print the recognized text.

use clap::Parser;
use ocr_service::config::TesseractConfig;
use ocr_service::services::{OcrBackend, TesseractBackend};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "extract-text")]
#[command(about = "Extract text from an image with the local OCR engine")]
#[command(version)]
struct Cli {
    /// Image to read
    #[arg(default_value = "image.png")]
    image: PathBuf,

    /// OCR engine executable
    #[arg(long, env = "TESSERACT_BINARY", default_value = "tesseract")]
    binary: String,

    /// Engine language code
    #[arg(short, long, env = "TESSERACT_LANGUAGE", default_value = "eng")]
    language: String,

    /// Seconds before the engine is killed
    #[arg(long, env = "TESSERACT_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the result.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let image = tokio::fs::read(&cli.image).await.map_err(|e| {
        anyhow::anyhow!("failed to read image '{}': {}", cli.image.display(), e)
    })?;

    let backend = TesseractBackend::new(TesseractConfig {
        binary: cli.binary,
        language: cli.language,
        timeout_secs: cli.timeout_secs,
    });

    let text = match backend.recognize(&image).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                image = %cli.image.display(),
                error_kind = e.kind(),
                error = %e,
                "OCR failed, printing empty text"
            );
            String::new()
        }
    };

    println!("Extracted Text: {}", text);
    Ok(())
}

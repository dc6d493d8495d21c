//! Local OCR through the `tesseract` command-line engine.
//!
//! The image is decoded first (so garbage is rejected before spawning a
//! process), normalized to PNG, and piped to `tesseract stdin stdout`. Each
//! non-empty output line is one recognized fragment.

use super::{join_fragments, OcrBackend, OcrError};
use crate::config::TesseractConfig;
use crate::services::executor::CommandExecutor;
use async_trait::async_trait;
use image::ImageFormat;
use std::io::Cursor;
use std::time::Duration;

pub struct TesseractBackend {
    config: TesseractConfig,
    executor: CommandExecutor,
}

impl TesseractBackend {
    pub fn new(config: TesseractConfig) -> Self {
        let executor = CommandExecutor::new(Duration::from_secs(config.timeout_secs));
        Self { config, executor }
    }

    /// Decode `image` into pixels and re-encode it as PNG.
    pub fn normalize_to_png(image: &[u8]) -> Result<Vec<u8>, OcrError> {
        let decoded =
            image::load_from_memory(image).map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        tracing::debug!(
            width = decoded.width(),
            height = decoded.height(),
            "Decoded image for local OCR"
        );

        let mut buffer = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(format!("failed to re-encode as PNG: {}", e)))?;

        Ok(buffer)
    }
}

/// Turn raw engine output into the relay's single-line text.
fn clean_engine_output(stdout: &str) -> String {
    join_fragments(stdout.lines().map(str::trim).filter(|line| !line.is_empty()))
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let owned = image.to_vec();
        let png = tokio::task::spawn_blocking(move || Self::normalize_to_png(&owned))
            .await
            .map_err(|e| OcrError::Aborted(e.to_string()))??;

        let output = self
            .executor
            .execute_with_input(
                &self.config.binary,
                &["stdin", "stdout", "-l", self.config.language.as_str()],
                png,
            )
            .await?;

        let text = clean_engine_output(&String::from_utf8_lossy(&output.stdout));

        tracing::info!(
            language = %self.config.language,
            text_len = text.len(),
            "Tesseract extraction complete"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn tiny_jpeg() -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 3, Rgb([255, 255, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    #[test]
    fn engine_output_lines_become_fragments() {
        let stdout = "Name  Age\n\nAlice 30\n   \nBob 25\n\x0c";
        assert_eq!(clean_engine_output(stdout), "Name  Age Alice 30 Bob 25");
        assert_eq!(clean_engine_output("\n\x0c"), "");
    }

    #[test]
    fn jpeg_is_normalized_to_png() {
        let png = TesseractBackend::normalize_to_png(&tiny_jpeg()).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let round_trip = image::load_from_memory(&png).unwrap();
        assert_eq!((round_trip.width(), round_trip.height()), (4, 3));
    }

    #[test]
    fn non_image_bytes_are_rejected() {
        assert!(matches!(
            TesseractBackend::normalize_to_png(b"hello world"),
            Err(OcrError::InvalidImage(_))
        ));
    }

    #[tokio::test]
    async fn missing_engine_binary_is_an_engine_error() {
        let backend = TesseractBackend::new(TesseractConfig {
            binary: "definitely-not-tesseract".to_string(),
            ..TesseractConfig::default()
        });

        let err = backend.recognize(&tiny_jpeg()).await.unwrap_err();
        assert!(matches!(err, OcrError::Engine(_)));
    }

    /// Stand-in engine that insists on `stdin stdout -l deu` and a PNG on stdin.
    #[cfg(unix)]
    const FAKE_ENGINE: &str = r#"#!/bin/sh
[ "$1" = stdin ] && [ "$2" = stdout ] && [ "$3" = -l ] && [ "$4" = deu ] || {
    echo "bad args: $*" >&2
    exit 2
}
sig=$(head -c 4 | tail -c 3)
cat >/dev/null
[ "$sig" = PNG ] || { echo "stdin is not a PNG" >&2; exit 2; }
printf 'Name  Age\n\nAlice 30\n\014'
"#;

    #[cfg(unix)]
    fn fake_engine(dir: &tempfile::TempDir) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-tesseract");
        std::fs::write(&path, FAKE_ENGINE).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn engine_is_fed_png_and_its_output_is_joined() {
        let dir = tempfile::tempdir().unwrap();
        let backend = TesseractBackend::new(TesseractConfig {
            binary: fake_engine(&dir),
            language: "deu".to_string(),
            ..TesseractConfig::default()
        });

        let text = backend.recognize(&tiny_jpeg()).await.unwrap();
        assert_eq!(text, "Name  Age Alice 30");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn engine_failure_keeps_its_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let backend = TesseractBackend::new(TesseractConfig {
            binary: fake_engine(&dir),
            language: "eng".to_string(),
            ..TesseractConfig::default()
        });

        let err = backend.recognize(&tiny_jpeg()).await.unwrap_err();
        assert!(err.to_string().contains("bad args: stdin stdout -l eng"));
    }
}

//! Decoding of base64 image payloads sent by browser clients.
//!
//! Clients usually send `canvas.toDataURL()` output
//! (`data:image/png;base64,iVBOR...`), but a bare base64 body is accepted too.

use base64::Engine;
use thiserror::Error;

/// Payloads starting with this are treated as data URIs.
const DATA_URI_SCHEME: &str = "data:image";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Data URI has no ',' separating the header from the image data")]
    MalformedDataUri,

    #[error("Image data is empty")]
    Empty,

    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Return the base64 body of `payload`, dropping a `data:image/...;base64,`
/// header when present.
pub fn strip_data_uri(payload: &str) -> Result<&str, PayloadError> {
    if !payload.starts_with(DATA_URI_SCHEME) {
        return Ok(payload);
    }

    payload
        .split(',')
        .nth(1)
        .ok_or(PayloadError::MalformedDataUri)
}

/// Decode an image payload into raw image bytes.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, PayloadError> {
    let encoded = strip_data_uri(payload)?;

    // Line-wrapped base64 (MIME style) shows up when payloads are pasted by hand.
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if compact.is_empty() {
        return Err(PayloadError::Empty);
    }

    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}

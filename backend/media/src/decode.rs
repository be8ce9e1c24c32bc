//! Base64 and data-URL image decoding.

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;

use visiongate_core::OcrError;

/// A decoded inline image and the MIME type its data URL declared, if any.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Bytes,
    pub declared_mime: Option<String>,
}

/// Decode raw base64 or a `data:<mime>;base64,<payload>` URL.
///
/// Embedded whitespace and line breaks are ignored.
pub fn decode_base64_image(input: &str) -> Result<DecodedImage, OcrError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(OcrError::InvalidImage("base64 payload is empty".into()));
    }

    let (declared_mime, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| OcrError::InvalidImage("data URL has no ',' separator".into()))?;
            let Some(mime) = header.strip_suffix(";base64") else {
                return Err(OcrError::InvalidImage("data URL is not base64-encoded".into()));
            };
            let mime = (!mime.is_empty()).then(|| mime.to_ascii_lowercase());
            (mime, payload)
        }
        None => (None, input),
    };

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| OcrError::InvalidImage(format!("invalid base64: {e}")))?;

    if bytes.is_empty() {
        return Err(OcrError::InvalidImage("decoded image is empty".into()));
    }

    Ok(DecodedImage {
        bytes: Bytes::from(bytes),
        declared_mime,
    })
}

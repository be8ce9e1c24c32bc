//! Image acquisition: turns an upload, URL, or base64 payload into
//! validated image bytes ready for the OCR provider.

use bytes::Bytes;
use tracing::debug;

use visiongate_core::OcrError;

use crate::decode::decode_base64_image;
use crate::fetch::ImageFetcher;
use crate::mime_detect::{detect_image_mime, is_image};

/// Where a request's image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Upload {
        bytes: Bytes,
        filename: Option<String>,
        content_type: Option<String>,
    },
    Url {
        url: String,
        authorization: Option<String>,
    },
    Base64 {
        data: String,
    },
}

impl ImageSource {
    /// Short description for logs; URLs are redacted by the caller's logger.
    pub fn describe(&self) -> String {
        match self {
            Self::Upload { filename, .. } => {
                format!("upload:{}", filename.as_deref().unwrap_or("unnamed"))
            }
            Self::Url { url, .. } => format!("url:{url}"),
            Self::Base64 { data } => format!("base64:{}b", data.len()),
        }
    }
}

/// Validated image bytes.
#[derive(Debug, Clone)]
pub struct AcquiredImage {
    pub bytes: Bytes,
    pub mime_type: String,
}

/// Resolve `source` into image bytes, enforcing size and type checks.
pub async fn acquire_image(
    source: ImageSource,
    fetcher: &ImageFetcher,
) -> Result<AcquiredImage, OcrError> {
    let (bytes, declared) = match source {
        ImageSource::Upload {
            bytes,
            content_type,
            ..
        } => (bytes, content_type),
        ImageSource::Url { url, authorization } => {
            (fetcher.fetch(&url, authorization.as_deref()).await?, None)
        }
        ImageSource::Base64 { data } => {
            let decoded = decode_base64_image(&data)?;
            (decoded.bytes, decoded.declared_mime)
        }
    };

    validate_image(bytes, declared.as_deref(), fetcher.max_bytes())
}

/// Size and type checks shared by every source.
pub fn validate_image(
    bytes: Bytes,
    declared_mime: Option<&str>,
    max_bytes: usize,
) -> Result<AcquiredImage, OcrError> {
    if bytes.is_empty() {
        return Err(OcrError::InvalidImage("image is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(OcrError::PayloadTooLarge { limit: max_bytes });
    }

    let mime_type = match (detect_image_mime(&bytes), declared_mime) {
        (Some(sniffed), _) => sniffed.to_string(),
        (None, Some(declared)) if is_image(declared) => declared.trim().to_ascii_lowercase(),
        (None, declared) => {
            return Err(OcrError::UnsupportedMediaType(
                declared.unwrap_or("unknown").to_string(),
            ));
        }
    };

    debug!(mime = %mime_type, bytes = bytes.len(), "Image accepted");
    Ok(AcquiredImage { bytes, mime_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn fetcher(max: usize) -> ImageFetcher {
        ImageFetcher::new(max, Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn upload_is_sniffed() {
        let image = acquire_image(
            ImageSource::Upload {
                bytes: Bytes::from_static(PNG),
                filename: Some("a.bin".into()),
                content_type: Some("application/octet-stream".into()),
            },
            &fetcher(1024),
        )
        .await
        .unwrap();
        assert_eq!(image.mime_type, "image/png");
    }

    #[tokio::test]
    async fn base64_source_decodes() {
        let image = acquire_image(
            ImageSource::Base64 {
                data: "data:image/png;base64,iVBORw0KGgo=".into(),
            },
            &fetcher(1024),
        )
        .await
        .unwrap();
        assert_eq!(image.bytes.len(), 8);
    }

    #[test]
    fn declared_image_type_is_trusted_when_sniffing_fails() {
        let image = validate_image(Bytes::from_static(b"\0\0\0 ftypheic"), Some("image/heic"), 1024)
            .unwrap();
        assert_eq!(image.mime_type, "image/heic");
    }

    #[test]
    fn text_payload_rejected() {
        let err = validate_image(Bytes::from_static(b"plain text"), Some("text/plain"), 1024)
            .unwrap_err();
        assert!(matches!(err, OcrError::UnsupportedMediaType(ref m) if m == "text/plain"));
    }

    #[test]
    fn oversized_payload_rejected() {
        let err = validate_image(Bytes::from_static(PNG), None, 4).unwrap_err();
        assert!(matches!(err, OcrError::PayloadTooLarge { limit: 4 }));
    }

    #[test]
    fn describe_sources() {
        let src = ImageSource::Base64 { data: "abcd".into() };
        assert_eq!(src.describe(), "base64:4b");
    }
}

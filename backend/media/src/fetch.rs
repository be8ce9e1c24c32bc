//! Remote image download.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use reqwest::{header, Client};
use tracing::{debug, warn};
use url::Url;

use logging::redact_sensitive_data;
use visiongate_core::OcrError;

/// Downloads images by URL with a hard size cap.
#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
    max_bytes: usize,
}

impl ImageFetcher {
    pub fn new(max_bytes: usize, timeout: Duration) -> Result<Self, OcrError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("visiongate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OcrError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, max_bytes })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// GET `url`, optionally forwarding the caller's `Authorization` value.
    pub async fn fetch(&self, url: &str, authorization: Option<&str>) -> Result<Bytes, OcrError> {
        let parsed = parse_image_url(url)?;
        let safe_url = redact_sensitive_data(parsed.as_str());
        debug!(url = %safe_url, forwarded_auth = authorization.is_some(), "Fetching image");

        let mut request = self.client.get(parsed);
        if let Some(auth) = authorization {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let mut response = request
            .send()
            .await
            .map_err(|e| OcrError::ImageFetch(redact_sensitive_data(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %safe_url, %status, "Image host returned an error");
            return Err(OcrError::ImageFetch(format!("image host returned {status}")));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_bytes {
                return Err(OcrError::PayloadTooLarge {
                    limit: self.max_bytes,
                });
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| OcrError::ImageFetch(redact_sensitive_data(&e.to_string())))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(OcrError::PayloadTooLarge {
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %safe_url, bytes = body.len(), "Image fetched");
        Ok(body.freeze())
    }
}

/// Only absolute http(s) URLs are fetched.
pub fn parse_image_url(raw: &str) -> Result<Url, OcrError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| OcrError::InvalidImage(format!("invalid image URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(OcrError::InvalidImage(format!(
            "unsupported URL scheme '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_urls() {
        assert!(parse_image_url("https://example.com/a.png").is_ok());
        assert!(parse_image_url("  http://10.0.0.1:8080/img ").is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        for raw in ["file:///etc/passwd", "ftp://host/x.png", "not a url", ""] {
            assert!(
                matches!(parse_image_url(raw), Err(OcrError::InvalidImage(_))),
                "{raw} accepted"
            );
        }
    }

    #[tokio::test]
    async fn fetch_rejects_bad_scheme_before_network() {
        let fetcher = ImageFetcher::new(1024, Duration::from_secs(1)).unwrap();
        let err = fetcher.fetch("data:image/png;base64,AAAA", None).await.unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }
}

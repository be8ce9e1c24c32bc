//! Google Cloud Vision `images:annotate` client.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::debug;

use logging::redact_sensitive_data;
use visiongate_config::defaults::DEFAULT_VISION_ENDPOINT;
use visiongate_core::{DocumentSummary, OcrProvider, PageSummary, RawAnnotations, RawTextAnnotation};

use crate::credentials::Credentials;

/// Which Cloud Vision feature to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    TextDetection,
    DocumentTextDetection,
}

impl Feature {
    fn as_str(self) -> &'static str {
        match self {
            Self::TextDetection => "TEXT_DETECTION",
            Self::DocumentTextDetection => "DOCUMENT_TEXT_DETECTION",
        }
    }
}

/// Google Cloud Vision provider.
pub struct GoogleVisionProvider {
    client: Client,
    credentials: Credentials,
    endpoint: String,
    language_hints: Vec<String>,
}

impl GoogleVisionProvider {
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Cloud Vision HTTP client")?;
        Ok(Self {
            client,
            credentials,
            endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            language_hints: Vec::new(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language_hints(mut self, hints: Vec<String>) -> Self {
        self.language_hints = hints;
        self
    }

    fn annotate_url(&self) -> String {
        format!("{}/v1/images:annotate", self.endpoint)
    }

    fn build_request(&self, image: &[u8], feature: Feature) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: vec![FeatureRequest {
                    kind: feature.as_str().to_string(),
                }],
                image_context: (!self.language_hints.is_empty()).then(|| ImageContext {
                    language_hints: self.language_hints.clone(),
                }),
            }],
        }
    }

    async fn annotate(&self, image: &[u8], feature: Feature) -> Result<AnnotateImageResponse> {
        let start = Instant::now();
        let body = self.build_request(image, feature);

        let mut request = self.client.post(self.annotate_url()).json(&body);
        request = match &self.credentials {
            Credentials::ApiKey(key) => request.query(&[("key", key.as_str())]),
            Credentials::AccessToken(token) => request.bearer_auth(token),
        };

        debug!(feature = feature.as_str(), bytes = image.len(), "Sending request to Cloud Vision");

        let response = request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!(redact_sensitive_data(&e.to_string())))
            .context("Cloud Vision HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!(
                "Cloud Vision returned {}: {}",
                status,
                redact_sensitive_data(&api_error_message(&error_body))
            );
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .context("Failed to parse Cloud Vision response")?;

        debug!(latency_ms = start.elapsed().as_millis() as u64, "Cloud Vision responded");
        first_response(parsed)
    }
}

#[async_trait]
impl OcrProvider for GoogleVisionProvider {
    fn name(&self) -> &str {
        "google-vision"
    }

    async fn recognize_words(&self, image: &[u8]) -> Result<RawAnnotations> {
        let response = self.annotate(image, Feature::TextDetection).await?;
        Ok(response.into_raw_annotations())
    }

    async fn recognize_document(&self, image: &[u8]) -> Result<DocumentSummary> {
        let response = self.annotate(image, Feature::DocumentTextDetection).await?;
        Ok(response.into_document())
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<FeatureRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_context: Option<ImageContext>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct FeatureRequest {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext {
    language_hints: Vec<String>,
}

/// Top-level `images:annotate` response.
#[derive(Debug, Default, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub text_annotations: Vec<RawTextAnnotation>,
    #[serde(default)]
    pub full_text_annotation: Option<FullTextAnnotation>,
    #[serde(default)]
    pub error: Option<ApiStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FullTextAnnotation {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub blocks: Vec<IgnoredAny>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AnnotateImageResponse {
    pub fn into_raw_annotations(self) -> RawAnnotations {
        RawAnnotations {
            full_text: self.full_text_annotation.and_then(|f| f.text),
            annotations: self.text_annotations,
        }
    }

    pub fn into_document(self) -> DocumentSummary {
        let Some(full) = self.full_text_annotation else {
            return DocumentSummary::default();
        };
        DocumentSummary {
            text: full.text.unwrap_or_default().trim().to_string(),
            pages: full
                .pages
                .into_iter()
                .map(|p| PageSummary {
                    width: p.width.unwrap_or(0),
                    height: p.height.unwrap_or(0),
                    block_count: p.blocks.len(),
                    confidence: p.confidence.unwrap_or(0.0),
                })
                .collect(),
        }
    }
}

/// Take the single per-image response, surfacing an embedded error.
pub fn first_response(response: AnnotateResponse) -> Result<AnnotateImageResponse> {
    let Some(first) = response.responses.into_iter().next() else {
        return Ok(AnnotateImageResponse::default());
    };
    if let Some(err) = &first.error {
        if err.code.unwrap_or(0) != 0 || err.message.is_some() {
            bail!(
                "Cloud Vision error {}: {}",
                err.code.unwrap_or(0),
                err.message.as_deref().unwrap_or("unknown error")
            );
        }
    }
    Ok(first)
}

/// Pull `error.message` out of a Google error body, else return it as is.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: ApiStatus,
    }
    serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.chars().take(500).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use visiongate_core::{build_result, normalize, LineOptions};

    fn sample_response() -> serde_json::Value {
        json!({
            "responses": [{
                "textAnnotations": [
                    { "locale": "en", "description": "HELLO WORLD\nbye\n",
                      "boundingPoly": { "vertices": [{"x":5,"y":8},{"x":200,"y":8},{"x":200,"y":90},{"x":5,"y":90}] } },
                    { "description": "WORLD",
                      "boundingPoly": { "vertices": [{"x":120,"y":10},{"x":200,"y":10},{"x":200,"y":30},{"x":120,"y":30}] } },
                    { "description": "HELLO",
                      "boundingPoly": { "vertices": [{"x":5,"y":12},{"x":100,"y":12},{"x":100,"y":32},{"x":5,"y":32}] } },
                    { "description": "bye",
                      "boundingPoly": { "vertices": [{"x":5,"y":70},{"x":40},{"x":40,"y":90},{"y":90}] } }
                ],
                "fullTextAnnotation": {
                    "text": "HELLO WORLD\nbye\n",
                    "pages": [{ "width": 640, "height": 480, "confidence": 0.97,
                                "blocks": [{ "blockType": "TEXT" }, { "blockType": "TEXT" }] }]
                }
            }]
        })
    }

    #[test]
    fn parses_words_mode() {
        let parsed: AnnotateResponse = serde_json::from_value(sample_response()).unwrap();
        let raw = first_response(parsed).unwrap().into_raw_annotations();
        assert_eq!(raw.annotations.len(), 4);

        let result = build_result(normalize(&raw), &LineOptions::default());
        assert_eq!(result.full_text, "HELLO WORLD\nbye");
        assert_eq!(result.word_count, 3);
        assert_eq!(result.formatted_text, "HELLO WORLD\nbye");
        assert_eq!(result.lines[1].words[0].bounds(), (5.0, 70.0, 40.0, 90.0));
    }

    #[test]
    fn parses_document_mode() {
        let parsed: AnnotateResponse = serde_json::from_value(sample_response()).unwrap();
        let doc = first_response(parsed).unwrap().into_document();
        assert_eq!(doc.text, "HELLO WORLD\nbye");
        assert_eq!(
            doc.pages,
            vec![PageSummary {
                width: 640,
                height: 480,
                block_count: 2,
                confidence: 0.97
            }]
        );
    }

    #[test]
    fn empty_response_is_no_text() {
        let parsed: AnnotateResponse = serde_json::from_value(json!({ "responses": [{}] })).unwrap();
        let raw = first_response(parsed).unwrap().into_raw_annotations();
        assert!(raw.annotations.is_empty());
        assert!(first_response(AnnotateResponse::default()).is_ok());
    }

    #[test]
    fn embedded_error_is_surfaced() {
        let parsed: AnnotateResponse = serde_json::from_value(json!({
            "responses": [{ "error": { "code": 3, "message": "Bad image data." } }]
        }))
        .unwrap();
        let err = first_response(parsed).unwrap_err().to_string();
        assert!(err.contains("Bad image data"));
    }

    #[test]
    fn request_body_shape() {
        let provider = GoogleVisionProvider::new(
            Credentials::ApiKey("k".into()),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_endpoint("http://localhost:9999/")
        .with_language_hints(vec!["en".into()]);

        assert_eq!(provider.annotate_url(), "http://localhost:9999/v1/images:annotate");

        let body = serde_json::to_value(provider.build_request(b"abc", Feature::TextDetection)).unwrap();
        assert_eq!(body["requests"][0]["image"]["content"], "YWJj");
        assert_eq!(body["requests"][0]["features"][0]["type"], "TEXT_DETECTION");
        assert_eq!(body["requests"][0]["imageContext"]["languageHints"][0], "en");
    }

    #[test]
    fn default_endpoint_comes_from_config() {
        let provider =
            GoogleVisionProvider::new(Credentials::ApiKey("k".into()), Duration::from_secs(5)).unwrap();
        assert_eq!(
            provider.annotate_url(),
            format!("{DEFAULT_VISION_ENDPOINT}/v1/images:annotate")
        );
    }

    #[test]
    fn error_body_message_extracted() {
        let body = r#"{"error":{"code":403,"message":"API key not valid.","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(api_error_message(body), "API key not valid.");
        assert_eq!(api_error_message("plain"), "plain");
    }
}

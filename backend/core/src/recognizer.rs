//! Request pipeline: provider → normalizer → line reconstructor.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::error::OcrError;
use crate::lines::{reconstruct_lines, render_lines, LineOptions};
use crate::normalize::{normalize, NormalizedText};
use crate::traits::{OcrProvider, RawAnnotations};
use crate::types::{DocumentSummary, RecognitionResult};

/// Runs recognition against an injected provider.
///
/// Cheap to clone and safe to share across concurrent requests.
#[derive(Clone)]
pub struct TextRecognizer {
    provider: Arc<dyn OcrProvider>,
    options: LineOptions,
}

impl TextRecognizer {
    pub fn new(provider: Arc<dyn OcrProvider>, options: LineOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn options(&self) -> &LineOptions {
        &self.options
    }

    /// Recognize words in `image` and rebuild reading-order lines.
    #[instrument(skip_all, fields(provider = %self.provider.name(), bytes = image.len()))]
    pub async fn recognize(&self, image: &[u8]) -> Result<RecognitionResult, OcrError> {
        if image.is_empty() {
            return Err(OcrError::InvalidImage("image is empty".into()));
        }

        let start = Instant::now();
        let raw = self.provider.recognize_words(image).await.map_err(|e| {
            warn!(error = %e, "OCR provider call failed");
            OcrError::provider(self.provider.name(), &e)
        })?;

        let result = self.assemble(&raw);
        info!(
            words = result.word_count,
            lines = result.lines.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recognition complete"
        );
        Ok(result)
    }

    /// Page-level recognition; no line reconstruction is applied.
    #[instrument(skip_all, fields(provider = %self.provider.name(), bytes = image.len()))]
    pub async fn recognize_document(&self, image: &[u8]) -> Result<DocumentSummary, OcrError> {
        if image.is_empty() {
            return Err(OcrError::InvalidImage("image is empty".into()));
        }

        let summary = self.provider.recognize_document(image).await.map_err(|e| {
            warn!(error = %e, "OCR provider document call failed");
            OcrError::provider(self.provider.name(), &e)
        })?;
        info!(pages = summary.page_count(), "Document recognition complete");
        Ok(summary)
    }

    /// Shape raw provider output into the response contract.
    pub fn assemble(&self, raw: &RawAnnotations) -> RecognitionResult {
        build_result(normalize(raw), &self.options)
    }
}

/// Assemble a result from already-normalized words. Never fails.
pub fn build_result(normalized: NormalizedText, options: &LineOptions) -> RecognitionResult {
    if normalized.is_empty() {
        debug!("No token annotations; returning empty result");
        return RecognitionResult::no_text();
    }

    let lines = reconstruct_lines(&normalized.words, options);
    RecognitionResult {
        found: true,
        full_text: normalized.full_text.trim().to_string(),
        formatted_text: render_lines(&lines),
        word_count: normalized.words.len(),
        lines,
        words: normalized.words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RawTextAnnotation;
    use crate::types::PageSummary;
    use anyhow::{bail, Result};
    use async_trait::async_trait;

    struct StaticProvider {
        raw: RawAnnotations,
    }

    #[async_trait]
    impl OcrProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }
        async fn recognize_words(&self, _image: &[u8]) -> Result<RawAnnotations> {
            Ok(self.raw.clone())
        }
        async fn recognize_document(&self, _image: &[u8]) -> Result<DocumentSummary> {
            Ok(DocumentSummary {
                text: "doc".into(),
                pages: vec![PageSummary {
                    width: 800,
                    height: 600,
                    block_count: 2,
                    confidence: 0.9,
                }],
            })
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl OcrProvider for BrokenProvider {
        fn name(&self) -> &str {
            "broken"
        }
        async fn recognize_words(&self, _image: &[u8]) -> Result<RawAnnotations> {
            bail!("quota exceeded")
        }
        async fn recognize_document(&self, _image: &[u8]) -> Result<DocumentSummary> {
            bail!("quota exceeded")
        }
    }

    fn recognizer(raw: RawAnnotations) -> TextRecognizer {
        TextRecognizer::new(Arc::new(StaticProvider { raw }), LineOptions::default())
    }

    #[tokio::test]
    async fn test_recognize_builds_lines() {
        let raw = RawAnnotations {
            full_text: None,
            annotations: vec![
                RawTextAnnotation::new("  A B\nC  "),
                RawTextAnnotation::new("A").with_box(50.0, 10.0, 60.0, 20.0).with_confidence(0.8),
                RawTextAnnotation::new("B").with_box(10.0, 12.0, 20.0, 22.0),
                RawTextAnnotation::new("C").with_box(5.0, 60.0, 15.0, 70.0),
            ],
        };
        let result = recognizer(raw).recognize(b"png").await.unwrap();

        assert!(result.found);
        assert_eq!(result.full_text, "A B\nC");
        assert_eq!(result.word_count, 3);
        assert_eq!(result.words.len(), 3);
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0].text, "B A");
        assert_eq!(result.lines[1].text, "C");
        assert_eq!(result.formatted_text, "B A\nC");
    }

    #[tokio::test]
    async fn test_no_annotations_is_not_an_error() {
        let result = recognizer(RawAnnotations::default()).recognize(b"png").await.unwrap();
        assert_eq!(result, RecognitionResult::no_text());
    }

    #[tokio::test]
    async fn test_empty_image_rejected() {
        let err = recognizer(RawAnnotations::default()).recognize(b"").await.unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_is_wrapped() {
        let recognizer = TextRecognizer::new(Arc::new(BrokenProvider), LineOptions::default());
        match recognizer.recognize(b"png").await {
            Err(OcrError::ProviderFailure { provider, message }) => {
                assert_eq!(provider, "broken");
                assert!(message.contains("quota"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_document_mode_passthrough() {
        let summary = recognizer(RawAnnotations::default())
            .recognize_document(b"png")
            .await
            .unwrap();
        assert_eq!(summary.page_count(), 1);
        assert_eq!(summary.pages[0].block_count, 2);
    }
}

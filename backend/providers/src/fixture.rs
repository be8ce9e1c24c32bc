use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use visiongate_core::{DocumentSummary, OcrProvider, RawAnnotations};

use crate::google::{first_response, AnnotateResponse};

/// A provider that returns canned annotations regardless of the image.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    annotations: RawAnnotations,
    document: DocumentSummary,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotations(mut self, annotations: RawAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_document(mut self, document: DocumentSummary) -> Self {
        self.document = document;
        self
    }

    /// Replay a saved Cloud Vision `images:annotate` response body.
    pub fn from_vision_response(json: &str) -> Result<Self> {
        let parsed: AnnotateResponse =
            serde_json::from_str(json).context("Fixture is not a Cloud Vision response")?;
        let mut first = first_response(parsed)?;
        let annotations = RawAnnotations {
            full_text: first
                .full_text_annotation
                .as_ref()
                .and_then(|f| f.text.clone()),
            annotations: std::mem::take(&mut first.text_annotations),
        };
        Ok(Self {
            annotations,
            document: first.into_document(),
        })
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
        Self::from_vision_response(&raw)
    }
}

#[async_trait]
impl OcrProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn recognize_words(&self, _image: &[u8]) -> Result<RawAnnotations> {
        Ok(self.annotations.clone())
    }

    async fn recognize_document(&self, _image: &[u8]) -> Result<DocumentSummary> {
        Ok(self.document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visiongate_core::RawTextAnnotation;

    #[tokio::test]
    async fn returns_canned_annotations() {
        let provider = FixtureProvider::new().with_annotations(RawAnnotations {
            full_text: None,
            annotations: vec![RawTextAnnotation::new("hi"), RawTextAnnotation::new("hi")],
        });
        let raw = provider.recognize_words(b"ignored").await.unwrap();
        assert_eq!(raw.annotations.len(), 2);
        assert!(provider.recognize_document(b"x").await.unwrap().pages.is_empty());
    }

    #[tokio::test]
    async fn loads_saved_response_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.json");
        tokio::fs::write(
            &path,
            r#"{"responses":[{"textAnnotations":[{"description":"TOTAL 4.20"},{"description":"TOTAL"},{"description":"4.20"}],
                "fullTextAnnotation":{"text":"TOTAL 4.20","pages":[{"width":10,"height":20,"blocks":[{}]}]}}]}"#,
        )
        .await
        .unwrap();

        let provider = FixtureProvider::from_file(&path).await.unwrap();
        let raw = provider.recognize_words(b"x").await.unwrap();
        assert_eq!(raw.full_text.as_deref(), Some("TOTAL 4.20"));
        assert_eq!(raw.annotations.len(), 3);
        let doc = provider.recognize_document(b"x").await.unwrap();
        assert_eq!(doc.pages[0].block_count, 1);
    }

    #[test]
    fn rejects_non_vision_json() {
        assert!(FixtureProvider::from_vision_response("[1,2,3]").is_err());
    }
}

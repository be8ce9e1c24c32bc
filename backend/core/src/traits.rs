use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::DocumentSummary;

/// A text-recognition backend (Cloud Vision, a test fixture, ...).
///
/// Implementations are picked once at startup and injected into
/// [`crate::TextRecognizer`]; they own all network concerns.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Provider name (e.g., "google-vision", "fixture").
    fn name(&self) -> &str;

    /// Word-level recognition.
    async fn recognize_words(&self, image: &[u8]) -> Result<RawAnnotations>;

    /// Page-level document recognition.
    async fn recognize_document(&self, image: &[u8]) -> Result<DocumentSummary>;
}

/// Provider output before normalization. Every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnnotations {
    #[serde(default)]
    pub full_text: Option<String>,
    /// Token annotations; the first entry is the whole-text summary.
    #[serde(default)]
    pub annotations: Vec<RawTextAnnotation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTextAnnotation {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub bounding_poly: Option<RawBoundingPoly>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBoundingPoly {
    #[serde(default)]
    pub vertices: Vec<RawVertex>,
}

/// Cloud Vision omits zero-valued coordinates entirely.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RawVertex {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

impl RawTextAnnotation {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Attach an axis-aligned box given two opposite corners.
    pub fn with_box(mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let v = |x, y| RawVertex { x: Some(x), y: Some(y) };
        self.bounding_poly = Some(RawBoundingPoly {
            vertices: vec![v(x0, y0), v(x1, y0), v(x1, y1), v(x0, y1)],
        });
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_annotation_tolerates_sparse_json() {
        let raw: RawTextAnnotation = serde_json::from_value(serde_json::json!({
            "description": "Total",
            "boundingPoly": { "vertices": [ {}, { "x": 40 }, { "x": 40, "y": 12 }, { "y": 12 } ] }
        }))
        .unwrap();
        let poly = raw.bounding_poly.unwrap();
        assert_eq!(poly.vertices.len(), 4);
        assert!(poly.vertices[0].x.is_none());
        assert_eq!(poly.vertices[2].y, Some(12.0));
        assert!(raw.score.is_none());
    }
}

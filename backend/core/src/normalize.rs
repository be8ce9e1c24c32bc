//! Annotation normalizer.
//!
//! Turns whatever the provider returned into a flat list of
//! [`WordAnnotation`]s. Missing geometry and confidence default to zero;
//! nothing in here can fail.

use tracing::debug;

use crate::traits::{RawAnnotations, RawBoundingPoly, RawTextAnnotation};
use crate::types::{BoundingPoly, Vertex, WordAnnotation};

/// Normalized provider output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedText {
    pub full_text: String,
    pub words: Vec<WordAnnotation>,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Normalize raw provider annotations.
///
/// The first annotation is the provider's whole-text summary and is not a
/// word. An explicit `full_text` takes precedence over that summary.
pub fn normalize(raw: &RawAnnotations) -> NormalizedText {
    let Some((summary, tokens)) = raw.annotations.split_first() else {
        return NormalizedText::default();
    };

    let full_text = raw
        .full_text
        .clone()
        .or_else(|| summary.description.clone())
        .unwrap_or_default();

    let words = tokens
        .iter()
        .enumerate()
        .filter_map(|(idx, token)| {
            let word = normalize_token(token);
            if word.is_none() {
                debug!(index = idx + 1, "Dropping token annotation with empty text");
            }
            word
        })
        .collect();

    NormalizedText { full_text, words }
}

/// Normalize a single token. Returns `None` for blank text.
pub fn normalize_token(token: &RawTextAnnotation) -> Option<WordAnnotation> {
    let text = token.description.as_deref().map(str::trim).unwrap_or("");
    if text.is_empty() {
        return None;
    }

    let confidence = token
        .confidence
        .filter(|c| c.is_finite())
        .or(token.score.filter(|c| c.is_finite()))
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    Some(WordAnnotation {
        text: text.to_string(),
        confidence,
        bounding_box: normalize_poly(token.bounding_poly.as_ref()),
    })
}

fn normalize_poly(poly: Option<&RawBoundingPoly>) -> BoundingPoly {
    let mut out = BoundingPoly::default();
    let Some(poly) = poly else { return out };

    for (slot, raw) in out.vertices.iter_mut().zip(poly.vertices.iter()) {
        *slot = Vertex::new(raw.x.unwrap_or(0.0), raw.y.unwrap_or(0.0));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RawVertex;

    fn summary(text: &str) -> RawTextAnnotation {
        RawTextAnnotation::new(text)
    }

    #[test]
    fn test_empty_annotations_yield_no_words() {
        let normalized = normalize(&RawAnnotations::default());
        assert!(normalized.is_empty());
        assert_eq!(normalized.full_text, "");
    }

    #[test]
    fn test_summary_is_skipped() {
        let raw = RawAnnotations {
            full_text: None,
            annotations: vec![
                summary("Hello world\n"),
                RawTextAnnotation::new("Hello").with_box(0.0, 0.0, 40.0, 10.0),
                RawTextAnnotation::new("world").with_box(50.0, 0.0, 90.0, 10.0),
            ],
        };
        let normalized = normalize(&raw);
        assert_eq!(normalized.full_text, "Hello world\n");
        let texts: Vec<_> = normalized.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "world"]);
    }

    #[test]
    fn test_explicit_full_text_wins() {
        let raw = RawAnnotations {
            full_text: Some("from document".into()),
            annotations: vec![summary("from summary"), RawTextAnnotation::new("x")],
        };
        assert_eq!(normalize(&raw).full_text, "from document");
    }

    #[test]
    fn test_summary_only_has_no_words() {
        let raw = RawAnnotations {
            full_text: None,
            annotations: vec![summary("lonely")],
        };
        let normalized = normalize(&raw);
        assert!(normalized.is_empty());
        assert_eq!(normalized.full_text, "lonely");
    }

    #[test]
    fn test_missing_geometry_defaults_to_zero() {
        let word = normalize_token(&RawTextAnnotation::new("bare")).unwrap();
        assert_eq!(word.bounding_box, BoundingPoly::default());
        assert_eq!(word.confidence, 0.0);
    }

    #[test]
    fn test_partial_vertices() {
        let token = RawTextAnnotation {
            description: Some("half".into()),
            bounding_poly: Some(RawBoundingPoly {
                vertices: vec![
                    RawVertex { x: Some(5.0), y: None },
                    RawVertex { x: None, y: Some(3.0) },
                ],
            }),
            ..Default::default()
        };
        let word = normalize_token(&token).unwrap();
        assert_eq!(word.bounds(), (5.0, 0.0, 0.0, 0.0));
        assert_eq!(word.bounding_box.vertices[1], Vertex::new(0.0, 3.0));
    }

    #[test]
    fn test_confidence_falls_back_to_score_and_clamps() {
        let mut token = RawTextAnnotation::new("a");
        token.score = Some(0.75);
        assert_eq!(normalize_token(&token).unwrap().confidence, 0.75);

        token.confidence = Some(1.5);
        assert_eq!(normalize_token(&token).unwrap().confidence, 1.0);

        token.confidence = Some(f32::NAN);
        assert_eq!(normalize_token(&token).unwrap().confidence, 0.75);
    }

    #[test]
    fn test_blank_tokens_are_dropped() {
        let raw = RawAnnotations {
            full_text: None,
            annotations: vec![summary("x"), RawTextAnnotation::new("  "), RawTextAnnotation::default()],
        };
        assert!(normalize(&raw).words.is_empty());
    }
}

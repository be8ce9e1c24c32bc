use serde::{Deserialize, Serialize};

/// A point in image pixel space. `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Four-corner polygon around a token, in the order
/// top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
    pub vertices: [Vertex; 4],
}

impl BoundingPoly {
    /// Axis-aligned polygon spanning two opposite corners.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            vertices: [
                Vertex::new(x0, y0),
                Vertex::new(x1, y0),
                Vertex::new(x1, y1),
                Vertex::new(x0, y1),
            ],
        }
    }

    pub fn top_left(&self) -> Vertex {
        self.vertices[0]
    }

    pub fn bottom_right(&self) -> Vertex {
        self.vertices[2]
    }
}

/// One recognized token after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAnnotation {
    pub text: String,
    /// Provider-reported confidence in `[0, 1]`; 0 when the provider gave none.
    pub confidence: f32,
    pub bounding_box: BoundingPoly,
}

impl WordAnnotation {
    pub fn new(text: impl Into<String>, confidence: f32, bounding_box: BoundingPoly) -> Self {
        Self {
            text: text.into(),
            confidence,
            bounding_box,
        }
    }

    /// Top-left x.
    pub fn x(&self) -> f64 {
        self.bounding_box.top_left().x
    }

    /// Top-left y.
    pub fn y(&self) -> f64 {
        self.bounding_box.top_left().y
    }

    /// `(top-left x, top-left y, bottom-right x, bottom-right y)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let tl = self.bounding_box.top_left();
        let br = self.bounding_box.bottom_right();
        (tl.x, tl.y, br.x, br.y)
    }
}

/// Axis-aligned rectangle covering every word of a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// A reconstructed visual row of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    /// 1-based position, top to bottom.
    pub line_number: usize,
    pub text: String,
    pub words: Vec<WordAnnotation>,
    pub bounding_box: LineBox,
    /// Top-left y of the word that opened the line. Never recomputed.
    pub average_y: f64,
}

/// What the gateway hands back for a words-mode request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    /// `false` when the provider returned no token annotations.
    pub found: bool,
    pub full_text: String,
    /// Line texts joined with `\n`, in reading order.
    pub formatted_text: String,
    pub word_count: usize,
    pub lines: Vec<Line>,
    pub words: Vec<WordAnnotation>,
}

impl RecognitionResult {
    pub fn no_text() -> Self {
        Self {
            found: false,
            full_text: String::new(),
            formatted_text: String::new(),
            word_count: 0,
            lines: Vec::new(),
            words: Vec::new(),
        }
    }
}

/// Page-level structure returned by the provider's document mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub width: u32,
    pub height: u32,
    pub block_count: usize,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub text: String,
    pub pages: Vec<PageSummary>,
}

impl DocumentSummary {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_bounds() {
        let word = WordAnnotation::new("hi", 0.9, BoundingPoly::from_corners(3.0, 4.0, 10.0, 12.0));
        assert_eq!(word.bounds(), (3.0, 4.0, 10.0, 12.0));
        assert_eq!(word.x(), 3.0);
        assert_eq!(word.y(), 4.0);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(RecognitionResult::no_text()).unwrap();
        assert_eq!(json["found"], false);
        assert_eq!(json["fullText"], "");
        assert_eq!(json["wordCount"], 0);
        assert!(json["lines"].as_array().unwrap().is_empty());
    }
}

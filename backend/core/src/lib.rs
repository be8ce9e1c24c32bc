//! Core types and the line-reconstruction pipeline for VisionGate.
//!
//! Providers produce [`RawAnnotations`]; [`normalize`] flattens them into
//! [`WordAnnotation`]s and [`reconstruct_lines`] groups those into
//! reading-order [`Line`]s.

pub mod error;
pub mod lines;
pub mod normalize;
pub mod recognizer;
pub mod traits;
pub mod types;

pub use error::OcrError;
pub use lines::{reconstruct_lines, render_lines, LineOptions, DEFAULT_LINE_THRESHOLD};
pub use normalize::{normalize, normalize_token, NormalizedText};
pub use recognizer::{build_result, TextRecognizer};
pub use traits::{OcrProvider, RawAnnotations, RawBoundingPoly, RawTextAnnotation, RawVertex};
pub use types::{
    BoundingPoly, DocumentSummary, Line, LineBox, PageSummary, RecognitionResult, Vertex,
    WordAnnotation,
};

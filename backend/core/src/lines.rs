//! Line reconstruction.
//!
//! Groups an unordered bag of word boxes into reading-order lines:
//! words are sorted top to bottom, a line is opened by its first word and
//! accepts every following word whose top edge lies within `threshold`
//! pixels of that first word, then each line is re-sorted left to right.
//!
//! The anchor stays pinned to the word that opened the line. It is not a
//! running average and it does not follow the last accepted word, so a
//! slowly descending baseline (skewed or curved text) is split once it
//! drifts more than `threshold` below the opening word.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{Line, LineBox, WordAnnotation};

/// Default vertical grouping distance, in pixels.
pub const DEFAULT_LINE_THRESHOLD: f64 = 20.0;

/// Tunables for [`reconstruct_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineOptions {
    /// Max `|y - anchor|` for a word to join the current line. Depends on
    /// image DPI, so it is configurable rather than fixed.
    pub threshold: f64,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LINE_THRESHOLD,
        }
    }
}

impl LineOptions {
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

fn by_position(a: &WordAnnotation, b: &WordAnnotation) -> Ordering {
    a.y().total_cmp(&b.y()).then_with(|| a.x().total_cmp(&b.x()))
}

/// Group words into lines in reading order. Pure and infallible.
pub fn reconstruct_lines(words: &[WordAnnotation], options: &LineOptions) -> Vec<Line> {
    let mut sorted: Vec<&WordAnnotation> = words.iter().collect();
    sorted.sort_by(|a, b| by_position(a, b));

    let mut groups: Vec<(f64, Vec<WordAnnotation>)> = Vec::new();
    for word in sorted {
        match groups.last_mut() {
            Some((anchor, members)) if (word.y() - *anchor).abs() <= options.threshold => {
                members.push(word.clone());
            }
            _ => groups.push((word.y(), vec![word.clone()])),
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(idx, (anchor, members))| build_line(idx + 1, anchor, members))
        .collect()
}

fn build_line(line_number: usize, anchor: f64, mut words: Vec<WordAnnotation>) -> Line {
    words.sort_by(|a, b| a.x().total_cmp(&b.x()));

    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Line {
        line_number,
        text,
        bounding_box: line_box(&words),
        words,
        average_y: anchor,
    }
}

fn line_box(words: &[WordAnnotation]) -> LineBox {
    let Some(first) = words.first() else {
        return LineBox::default();
    };
    let (x0, y0, _, _) = first.bounds();
    let init = LineBox {
        min_x: x0,
        max_x: x0,
        min_y: y0,
        max_y: y0,
    };

    words.iter().fold(init, |acc, word| {
        let (x0, y0, x1, y1) = word.bounds();
        LineBox {
            min_x: acc.min_x.min(x0).min(x1),
            max_x: acc.max_x.max(x0).max(x1),
            min_y: acc.min_y.min(y0).min(y1),
            max_y: acc.max_y.max(y0).max(y1),
        }
    })
}

/// Render lines back as multi-line text.
pub fn render_lines(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

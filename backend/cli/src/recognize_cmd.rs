//! `visiongate recognize <file>`: one-shot OCR without the HTTP layer.

use std::path::Path;

use anyhow::{bail, Context, Result};
use bytes::Bytes;

use media::{detect_mime_type, validate_image};
use visiongate_config::VisionGateConfig;
use visiongate_core::{LineOptions, RecognitionResult, TextRecognizer};

use crate::terminal_output::{note_warn, render_table, Column, Align};

pub async fn run(
    config: &VisionGateConfig,
    file: &Path,
    json: bool,
    threshold: Option<f64>,
) -> Result<()> {
    let options = line_options(config, threshold)?;

    let raw = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read image: {}", file.display()))?;
    let image = validate_image(
        Bytes::from(raw),
        Some(detect_mime_type(file)),
        config.max_image_bytes(),
    )?;

    let provider = visiongate_providers::build_provider(config).await?;
    let recognizer = TextRecognizer::new(provider, options);
    let result = recognizer.recognize(&image.bytes).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn line_options(config: &VisionGateConfig, threshold: Option<f64>) -> Result<LineOptions> {
    let threshold = threshold.unwrap_or(config.line_threshold());
    if !threshold.is_finite() || threshold <= 0.0 {
        bail!("--threshold must be a positive number, got {threshold}");
    }
    Ok(LineOptions::with_threshold(threshold))
}

fn print_result(result: &RecognitionResult) {
    if !result.found {
        note_warn("No text found in image");
        return;
    }

    let columns = [
        Column::right("#"),
        Column::right("y"),
        Column {
            header: "Text".to_string(),
            align: Align::Left,
            max_width: Some(80),
        },
    ];
    let rows: Vec<Vec<String>> = result
        .lines
        .iter()
        .map(|line| {
            vec![
                line.line_number.to_string(),
                format!("{:.0}", line.average_y),
                line.text.clone(),
            ]
        })
        .collect();
    print!("{}", render_table(&columns, &rows));
    println!("\n{} words in {} lines", result.word_count, result.lines.len());
}

use thiserror::Error;

/// Top-level error type for the VisionGate request pipeline.
///
/// "No text found" and malformed geometry are not errors; they surface as
/// an empty [`crate::RecognitionResult`] and zeroed coordinates respectively.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR provider error ({provider}): {message}")]
    ProviderFailure { provider: String, message: String },

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("failed to fetch image: {0}")]
    ImageFetch(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("image exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OcrError {
    pub fn provider(provider: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::ProviderFailure {
            provider: provider.into(),
            message: format!("{err:#}"),
        }
    }
}

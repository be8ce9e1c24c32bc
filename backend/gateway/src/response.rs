//! JSON response envelope and error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use visiongate_core::OcrError;

pub const NO_TEXT_MESSAGE: &str = "No text found in image";

/// Envelope wrapped around every successful (HTTP 2xx) response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub request_id: String,
    pub processing_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(success: bool, message: impl Into<String>, data: T, request_id: &str, elapsed_ms: u64) -> Self {
        Self {
            success,
            message: message.into(),
            data,
            request_id: request_id.to_string(),
            processing_time_ms: elapsed_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Error body returned with a non-2xx status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// An HTTP-facing error.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            request_id: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// Map an extractor rejection. Oversized bodies keep their 413; every
    /// other malformed request is a 400.
    pub fn from_rejection(status: StatusCode, message: impl Into<String>) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::new(status, "payload_too_large", message)
        } else {
            Self::bad_request(message)
        }
    }

    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "Too many requests, please retry later",
        )
    }

    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        let (status, kind) = match &err {
            OcrError::InvalidImage(_) => (StatusCode::BAD_REQUEST, "invalid_image"),
            OcrError::UnsupportedMediaType(_) => (StatusCode::BAD_REQUEST, "unsupported_media_type"),
            OcrError::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            OcrError::ImageFetch(_) => (StatusCode::BAD_GATEWAY, "image_fetch_failed"),
            OcrError::ProviderFailure { .. } => (StatusCode::BAD_GATEWAY, "provider_failure"),
            OcrError::Config(_) | OcrError::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };
        // Provider and internal details stay in the logs.
        let message = match &err {
            OcrError::ProviderFailure { .. } => "Text recognition failed".to_string(),
            OcrError::Config(_) | OcrError::Other(_) => {
                error!(error = %err, "Internal error while handling OCR request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        Self::new(status, kind, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.message,
            error: self.kind,
            request_id: self.request_id,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (OcrError::InvalidImage("x".into()), StatusCode::BAD_REQUEST),
            (OcrError::UnsupportedMediaType("text/plain".into()), StatusCode::BAD_REQUEST),
            (OcrError::PayloadTooLarge { limit: 1 }, StatusCode::PAYLOAD_TOO_LARGE),
            (OcrError::ImageFetch("404".into()), StatusCode::BAD_GATEWAY),
            (
                OcrError::ProviderFailure {
                    provider: "google-vision".into(),
                    message: "quota".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (OcrError::Config("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_provider_details_are_hidden() {
        let api = ApiError::from(OcrError::ProviderFailure {
            provider: "google-vision".into(),
            message: "API key not valid".into(),
        });
        assert!(!api.message.contains("API key"));
        assert_eq!(api.kind, "provider_failure");
    }

    #[test]
    fn test_rejection_mapping() {
        let too_big = ApiError::from_rejection(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded");
        assert_eq!(too_big.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(too_big.kind, "payload_too_large");

        let bad_json = ApiError::from_rejection(StatusCode::UNPROCESSABLE_ENTITY, "missing field");
        assert_eq!(bad_json.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad_json.kind, "bad_request");
    }

    #[test]
    fn test_envelope_serializes_camel_case() {
        let resp = ApiResponse::new(true, "ok", 5, "req-1", 12);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["requestId"], "req-1");
        assert_eq!(json["processingTimeMs"], 12);
        assert_eq!(json["data"], 5);
    }
}

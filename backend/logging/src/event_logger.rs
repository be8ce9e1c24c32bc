//! Request Event Logger
//!
//! One structured audit event per OCR request, written through `tracing`
//! under the `ocr_requests` target so it lands in the NDJSON file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestEvent {
    Recognized {
        source: String,
        words: usize,
        lines: usize,
        elapsed_ms: u64,
    },
    NoText {
        source: String,
        elapsed_ms: u64,
    },
    Document {
        source: String,
        pages: usize,
        elapsed_ms: u64,
    },
    Failed {
        source: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct RequestLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: RequestEvent,
}

pub struct RequestLogger;

impl RequestLogger {
    /// Redacts free-text fields and emits the entry.
    pub fn log_event(request_id: &str, mut event: RequestEvent) -> RequestLogEntry {
        match &mut event {
            RequestEvent::Recognized { source, .. }
            | RequestEvent::NoText { source, .. }
            | RequestEvent::Document { source, .. } => {
                *source = redact_sensitive_data(source);
            }
            RequestEvent::Failed { source, error_msg } => {
                *source = redact_sensitive_data(source);
                *error_msg = redact_sensitive_data(error_msg);
            }
        }

        let entry = RequestLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        if matches!(entry.event, RequestEvent::Failed { .. }) {
            warn!(target: "ocr_requests", entry = %json, "OCR request failed");
        } else {
            info!(target: "ocr_requests", entry = %json, "OCR request");
        }
        entry
    }
}

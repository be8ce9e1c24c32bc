//! Telemetry and structured logging components for VisionGate.
//!
//! Handles log redaction, console/JSON output, file rotation, and
//! per-request audit events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{RequestEvent, RequestLogEntry, RequestLogger};
pub use logger::{init_logger, LogSettings};
pub use redact::redact_sensitive_data;

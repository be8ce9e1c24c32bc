//! VisionGate configuration schema.
//!
//! Every field is optional on disk; [`crate::defaults`] fills the gaps and
//! the accessor methods below read the effective value.

use serde::{Deserialize, Serialize};

use crate::defaults::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration, deserialized from `config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionGateConfig {
    /// HTTP server settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// OCR provider selection and credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    /// Line reconstruction tunables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrConfig>,

    /// Per-client request limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Allowed CORS origins; empty means permissive.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cors_origins: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_image_bytes: Option<usize>,

    /// Forward the caller's `Authorization` header when fetching image URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_authorization: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>, // "google" | "fixture"

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub language_hints: Vec<String>,

    /// Saved Cloud Vision response replayed by the fixture provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_requests: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>, // "pretty" | "json"
    /// Directory for daily-rolling NDJSON log files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Effective values
// ---------------------------------------------------------------------------

impl VisionGateConfig {
    pub fn host(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.host.as_deref())
            .unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.server.as_ref().and_then(|s| s.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn cors_origins(&self) -> &[String] {
        self.server
            .as_ref()
            .map(|s| s.cors_origins.as_slice())
            .unwrap_or(&[])
    }

    pub fn max_image_bytes(&self) -> usize {
        self.server
            .as_ref()
            .and_then(|s| s.max_image_bytes)
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES)
    }

    pub fn forward_authorization(&self) -> bool {
        self.server
            .as_ref()
            .and_then(|s| s.forward_authorization)
            .unwrap_or(true)
    }

    pub fn provider_kind(&self) -> &str {
        self.provider
            .as_ref()
            .and_then(|p| p.kind.as_deref())
            .unwrap_or(DEFAULT_PROVIDER_KIND)
    }

    pub fn line_threshold(&self) -> f64 {
        self.ocr
            .as_ref()
            .and_then(|o| o.line_threshold)
            .unwrap_or(DEFAULT_LINE_THRESHOLD)
    }

    pub fn rate_limit_enabled(&self) -> bool {
        self.rate_limit.as_ref().and_then(|r| r.enabled).unwrap_or(true)
    }

    pub fn rate_limit_max_requests(&self) -> u32 {
        self.rate_limit
            .as_ref()
            .and_then(|r| r.max_requests)
            .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS)
    }

    pub fn rate_limit_window_secs(&self) -> u64 {
        self.rate_limit
            .as_ref()
            .and_then(|r| r.window_secs)
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_json(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }
}

//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{
    LoggingConfig, OcrConfig, ProviderConfig, RateLimitConfig, ServerConfig, VisionGateConfig,
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// 10 MiB.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_PROVIDER_KIND: &str = "google";
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

pub use visiongate_core::DEFAULT_LINE_THRESHOLD;

pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 60;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "pretty";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: VisionGateConfig) -> VisionGateConfig {
    let config = apply_server_defaults(config);
    let config = apply_provider_defaults(config);
    let config = apply_ocr_defaults(config);
    let config = apply_rate_limit_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: VisionGateConfig) -> VisionGateConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.host.get_or_insert_with(|| DEFAULT_HOST.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server.max_image_bytes.get_or_insert(DEFAULT_MAX_IMAGE_BYTES);
    server.forward_authorization.get_or_insert(true);
    config
}

fn apply_provider_defaults(mut config: VisionGateConfig) -> VisionGateConfig {
    let provider = config.provider.get_or_insert_with(ProviderConfig::default);
    provider
        .kind
        .get_or_insert_with(|| DEFAULT_PROVIDER_KIND.to_string());
    provider
        .endpoint
        .get_or_insert_with(|| DEFAULT_VISION_ENDPOINT.to_string());
    provider.timeout_secs.get_or_insert(DEFAULT_PROVIDER_TIMEOUT_SECS);
    config
}

fn apply_ocr_defaults(mut config: VisionGateConfig) -> VisionGateConfig {
    let ocr = config.ocr.get_or_insert_with(OcrConfig::default);
    ocr.line_threshold.get_or_insert(DEFAULT_LINE_THRESHOLD);
    config
}

fn apply_rate_limit_defaults(mut config: VisionGateConfig) -> VisionGateConfig {
    let rl = config.rate_limit.get_or_insert_with(RateLimitConfig::default);
    rl.enabled.get_or_insert(true);
    rl.max_requests.get_or_insert(DEFAULT_RATE_LIMIT_MAX_REQUESTS);
    rl.window_secs.get_or_insert(DEFAULT_RATE_LIMIT_WINDOW_SECS);
    config
}

fn apply_logging_defaults(mut config: VisionGateConfig) -> VisionGateConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging
        .format
        .get_or_insert_with(|| DEFAULT_LOG_FORMAT.to_string());
    config
}

//! Config validation: schema checks with user-friendly error messages.

use crate::schema::VisionGateConfig;
use thiserror::Error;

/// Provider kinds understood by the gateway.
pub const KNOWN_PROVIDER_KINDS: &[&str] = &["google", "fixture"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &VisionGateConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_provider(config, &mut report);
    validate_ocr(config, &mut report);
    validate_rate_limit(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_server(config: &VisionGateConfig, report: &mut ValidationReport) {
    let Some(server) = &config.server else { return };
    match server.port {
        Some(0) => report.error("server.port", "Port must be between 1 and 65535"),
        Some(port) if port < 1024 && port != 80 && port != 443 => report.warn(
            "server.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        ),
        _ => {}
    }
    if server.max_image_bytes == Some(0) {
        report.error("server.maxImageBytes", "maxImageBytes must be > 0");
    }
    for (i, origin) in server.cors_origins.iter().enumerate() {
        if !(origin == "*" || origin.starts_with("http://") || origin.starts_with("https://")) {
            report.error(
                format!("server.corsOrigins[{i}]"),
                format!("Origin '{origin}' must start with http:// or https://"),
            );
        }
    }
}

fn validate_provider(config: &VisionGateConfig, report: &mut ValidationReport) {
    let Some(provider) = &config.provider else { return };
    let kind = config.provider_kind();
    if !KNOWN_PROVIDER_KINDS.contains(&kind) {
        report.error(
            "provider.kind",
            format!("Unknown provider '{kind}'; expected one of {KNOWN_PROVIDER_KINDS:?}"),
        );
    }
    if provider.timeout_secs == Some(0) {
        report.error("provider.timeoutSecs", "timeoutSecs must be > 0");
    }
    if let Some(endpoint) = &provider.endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            report.error("provider.endpoint", "Endpoint must be an http(s) URL");
        }
    }
    if kind == "google" && provider.api_key.is_some() && provider.access_token.is_some() {
        report.warn(
            "provider",
            "Both apiKey and accessToken are set; apiKey takes precedence",
        );
    }
    if kind == "fixture" && provider.fixture_path.is_none() {
        report.warn(
            "provider.fixturePath",
            "Fixture provider without fixturePath always returns no text",
        );
    }
}

fn validate_ocr(config: &VisionGateConfig, report: &mut ValidationReport) {
    let Some(threshold) = config.ocr.as_ref().and_then(|o| o.line_threshold) else {
        return;
    };
    if !threshold.is_finite() || threshold <= 0.0 {
        report.error("ocr.lineThreshold", "lineThreshold must be a positive number");
    } else if threshold > 500.0 {
        report.warn(
            "ocr.lineThreshold",
            format!("lineThreshold {threshold} is very large; most text will merge into one line"),
        );
    }
}

fn validate_rate_limit(config: &VisionGateConfig, report: &mut ValidationReport) {
    let Some(rl) = &config.rate_limit else { return };
    if rl.max_requests == Some(0) {
        report.error("rateLimit.maxRequests", "maxRequests must be > 0");
    }
    if rl.window_secs == Some(0) {
        report.error("rateLimit.windowSecs", "windowSecs must be > 0");
    }
}

fn validate_logging(config: &VisionGateConfig, report: &mut ValidationReport) {
    let Some(format) = config.logging.as_ref().and_then(|l| l.format.as_deref()) else {
        return;
    };
    if !matches!(format, "pretty" | "json") {
        report.error("logging.format", "format must be 'pretty' or 'json'");
    }
}

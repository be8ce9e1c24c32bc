//! `visiongate-config` — VisionGate runtime configuration management.
//!
//! Provides:
//! - Typed config schema (server, provider, OCR, rate limit, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution and `VISIONGATE_*` overrides
//! - Config redaction for safe logging/display
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::{redact, redacted_config};
pub use schema::{
    LoggingConfig, OcrConfig, ProviderConfig, RateLimitConfig, ServerConfig, VisionGateConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// A validated config plus the warnings found while preparing it.
///
/// Warnings are returned rather than logged so the caller can report them
/// once its logger (or terminal output) is set up.
#[derive(Debug)]
pub struct PreparedConfig {
    pub config: VisionGateConfig,
    pub warnings: Vec<ConfigValidationError>,
}

/// Load, substitute env vars, apply overrides and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime. The first
/// validation error aborts.
pub async fn load_and_prepare(path: &Path) -> Result<PreparedConfig> {
    let raw_config = load_config(path).await?;
    prepare_with_env(raw_config, &std::env::vars().collect())
}

/// The env-dependent half of [`load_and_prepare`], split out for tests.
pub fn prepare_with_env(
    raw_config: VisionGateConfig,
    env: &HashMap<String, String>,
) -> Result<PreparedConfig> {
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;

    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: VisionGateConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let mut env_report = ValidationReport::default();
    let config = apply_all_defaults(apply_env_overrides(config, env, &mut env_report));

    let report = validate(&config);
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }

    let mut warnings = env_report.warnings;
    warnings.extend(report.warnings);
    Ok(PreparedConfig { config, warnings })
}

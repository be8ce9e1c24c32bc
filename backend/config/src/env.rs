//! Environment variable substitution and overrides for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${VAR}` escapes to a literal `${VAR}`.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::schema::{OcrConfig, ServerConfig, VisionGateConfig};
use crate::validation::ValidationReport;

/// Matches `${VAR}` and its escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var regex"));

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Returns an error if any referenced env var is not set or is empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute_value(value, env, "")?)
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[1];
        if caps[0].starts_with("$$") {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(substituted.into_owned()),
    }
}

/// Apply `VISIONGATE_*` environment overrides on top of the file config.
///
/// Unparseable values are ignored and recorded as warnings in `report`.
pub fn apply_env_overrides(
    mut config: VisionGateConfig,
    env: &HashMap<String, String>,
    report: &mut ValidationReport,
) -> VisionGateConfig {
    if let Some(host) = env.get("VISIONGATE_HOST").filter(|h| !h.is_empty()) {
        debug!(host = %host, "Host overridden from environment");
        config.server.get_or_insert_with(ServerConfig::default).host = Some(host.clone());
    }

    if let Some(raw) = env.get("VISIONGATE_PORT") {
        match raw.parse::<u16>() {
            Ok(port) => {
                config.server.get_or_insert_with(ServerConfig::default).port = Some(port)
            }
            Err(_) => report.warn(
                "VISIONGATE_PORT",
                format!("Ignoring invalid value '{raw}'; expected a port number"),
            ),
        }
    }

    if let Some(raw) = env.get("VISIONGATE_LINE_THRESHOLD") {
        match raw.parse::<f64>() {
            Ok(threshold) => {
                config.ocr.get_or_insert_with(OcrConfig::default).line_threshold =
                    Some(threshold)
            }
            Err(_) => report.warn(
                "VISIONGATE_LINE_THRESHOLD",
                format!("Ignoring invalid value '{raw}'; expected a number"),
            ),
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"provider": {"apiKey": "${GOOGLE_API_KEY}"}});
        let result = resolve_env_vars_with(&v, &env(&[("GOOGLE_API_KEY", "AIza123")])).unwrap();
        assert_eq!(result["provider"]["apiKey"], "AIza123");
    }

    #[test]
    fn error_on_missing_var_names_path() {
        let v = json!({"provider": {"accessToken": "${MISSING_TOKEN}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_TOKEN"));
        assert!(err.contains("provider.accessToken"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"note": "$${NOT_A_VAR} and ${REAL}"});
        let result = resolve_env_vars_with(&v, &env(&[("REAL", "yes")])).unwrap();
        assert_eq!(result["note"], "${NOT_A_VAR} and yes");
    }

    #[test]
    fn substitutes_inside_arrays() {
        let v = json!({"server": {"corsOrigins": ["${ORIGIN}", "https://fixed"]}});
        let result = resolve_env_vars_with(&v, &env(&[("ORIGIN", "https://a")])).unwrap();
        assert_eq!(result["server"]["corsOrigins"][0], "https://a");
        assert_eq!(result["server"]["corsOrigins"][1], "https://fixed");
    }

    #[test]
    fn lowercase_names_are_not_substituted() {
        let v = json!({"key": "${lower}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["key"], "${lower}");
    }

    #[test]
    fn overrides_apply_and_bad_values_are_reported() {
        let mut report = ValidationReport::default();
        let cfg = apply_env_overrides(
            VisionGateConfig::default(),
            &env(&[
                ("VISIONGATE_PORT", "9000"),
                ("VISIONGATE_LINE_THRESHOLD", "not-a-number"),
                ("VISIONGATE_HOST", "127.0.0.1"),
            ]),
            &mut report,
        );
        assert_eq!(cfg.port(), 9000);
        assert_eq!(cfg.host(), "127.0.0.1");
        assert_eq!(cfg.line_threshold(), 20.0);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "VISIONGATE_LINE_THRESHOLD");
        assert!(report.warnings[0].message.contains("not-a-number"));
    }
}

//! Config redaction: produce safe-to-share config snapshots by masking
//! credentials.

use serde_json::Value;

use crate::schema::VisionGateConfig;

static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "accessToken",
    "access_token",
    "token",
    "secret",
    "password",
    "privateKey",
    "private_key",
];

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Redact a config JSON value, masking sensitive fields.
///
/// The first four characters are kept as a hint, the rest becomes `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

/// Serialize and redact a typed config.
pub fn redacted_config(config: &VisionGateConfig) -> Value {
    serde_json::to_value(config)
        .map(|v| redact(&v))
        .unwrap_or(Value::Null)
}

fn mask(s: &str) -> String {
    let hint: String = s.chars().take(4).collect();
    if s.chars().count() > 4 {
        format!("{hint}***")
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ProviderConfig;
    use serde_json::json;

    #[test]
    fn redacts_api_key() {
        let v = json!({ "provider": { "apiKey": "AIzaSyDummyKey123" } });
        let key = redact(&v)["provider"]["apiKey"].as_str().unwrap().to_string();
        assert_eq!(key, "AIza***");
    }

    #[test]
    fn short_secret_fully_masked() {
        let v = json!({ "accessToken": "abc" });
        assert_eq!(redact(&v)["accessToken"], "***");
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "logging": { "level": "debug" }, "server": { "port": 8080 } });
        let redacted = redact(&v);
        assert_eq!(redacted["logging"]["level"], "debug");
        assert_eq!(redacted["server"]["port"], 8080);
    }

    #[test]
    fn redacts_typed_config() {
        let cfg = VisionGateConfig {
            provider: Some(ProviderConfig {
                access_token: Some("ya29.secret-token".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let value = redacted_config(&cfg);
        assert_eq!(value["provider"]["accessToken"], "ya29***");
    }
}

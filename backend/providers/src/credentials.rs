//! Credential strategy selection for Google Cloud Vision.
//!
//! Resolved once at startup. Order: explicit config API key, explicit
//! config access token, `GOOGLE_API_KEY`, `GOOGLE_CLOUD_VISION_API_KEY`,
//! `GOOGLE_OAUTH_ACCESS_TOKEN`.

use std::collections::HashMap;
use std::fmt;

use anyhow::{bail, Result};

const ENV_API_KEYS: &[&str] = &["GOOGLE_API_KEY", "GOOGLE_CLOUD_VISION_API_KEY"];
const ENV_ACCESS_TOKEN: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Sent as the `key` query parameter.
    ApiKey(String),
    /// Sent as `Authorization: Bearer`.
    AccessToken(String),
}

impl Credentials {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api_key",
            Self::AccessToken(_) => "access_token",
        }
    }
}

// Never print the secret itself.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credentials::{}(***)", self.kind())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Pick the first available credential.
pub fn resolve_credentials(
    api_key: Option<&str>,
    access_token: Option<&str>,
    env: &HashMap<String, String>,
) -> Result<Credentials> {
    if let Some(key) = non_empty(api_key) {
        return Ok(Credentials::ApiKey(key));
    }
    if let Some(token) = non_empty(access_token) {
        return Ok(Credentials::AccessToken(token));
    }
    for var in ENV_API_KEYS {
        if let Some(key) = non_empty(env.get(*var).map(String::as_str)) {
            return Ok(Credentials::ApiKey(key));
        }
    }
    if let Some(token) = non_empty(env.get(ENV_ACCESS_TOKEN).map(String::as_str)) {
        return Ok(Credentials::AccessToken(token));
    }
    bail!(
        "no Google Cloud Vision credentials: set provider.apiKey, provider.accessToken, \
         GOOGLE_API_KEY or GOOGLE_OAUTH_ACCESS_TOKEN"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn explicit_key_wins() {
        let creds = resolve_credentials(
            Some("cfg-key"),
            Some("cfg-token"),
            &env(&[("GOOGLE_API_KEY", "env-key")]),
        )
        .unwrap();
        assert_eq!(creds, Credentials::ApiKey("cfg-key".into()));
    }

    #[test]
    fn blank_values_are_skipped() {
        let creds = resolve_credentials(
            Some("  "),
            None,
            &env(&[("GOOGLE_API_KEY", ""), ("GOOGLE_OAUTH_ACCESS_TOKEN", "ya29.t")]),
        )
        .unwrap();
        assert_eq!(creds, Credentials::AccessToken("ya29.t".into()));
    }

    #[test]
    fn env_api_key_before_env_token() {
        let creds = resolve_credentials(
            None,
            None,
            &env(&[
                ("GOOGLE_CLOUD_VISION_API_KEY", "vision-key"),
                ("GOOGLE_OAUTH_ACCESS_TOKEN", "tok"),
            ]),
        )
        .unwrap();
        assert_eq!(creds.kind(), "api_key");
    }

    #[test]
    fn nothing_configured_is_error() {
        assert!(resolve_credentials(None, None, &HashMap::new()).is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let dbg = format!("{:?}", Credentials::ApiKey("AIzaSecret".into()));
        assert!(!dbg.contains("Secret"));
    }
}

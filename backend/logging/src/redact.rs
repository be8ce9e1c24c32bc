//! Log Redaction Layer
//!
//! Scrubs bearer tokens, Google API keys, and `key=` query parameters from
//! strings (image URLs, provider error bodies) prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(Bearer|Basic)\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());
static GOOGLE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AIza[0-9A-Za-z\-_]{20,}").unwrap());
static QUERY_SECRET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([?&](?:key|api_key|access_token|token|sig|signature)=)[^&#\s]+").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "$1 [REDACTED_TOKEN]");
    let redacted = GOOGLE_KEY_RE.replace_all(&redacted, "[REDACTED_KEY]");
    QUERY_SECRET_RE
        .replace_all(&redacted, "${1}[REDACTED]")
        .into_owned()
}

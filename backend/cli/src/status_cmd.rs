//! CLI Status Command
//!
//! Reports whether a local gateway is up and what it is configured with.

use std::time::Duration;

use anyhow::Result;

use visiongate_config::VisionGateConfig;

use crate::terminal_output::{note_error, note_success, render_table, Column};

/// The bind host is usually a wildcard; probe loopback instead.
fn probe_host(host: &str) -> &str {
    match host {
        "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
        other => other,
    }
}

pub async fn run(config: &VisionGateConfig) -> Result<()> {
    let url = format!(
        "http://{}:{}/api/health",
        probe_host(config.host()),
        config.port()
    );
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await?;
            note_success(&format!("VisionGate is running at {url}"));
            let field = |key: &str| match &body[key] {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            let rows = vec![
                vec!["version".to_string(), field("version")],
                vec!["provider".to_string(), field("provider")],
                vec!["lineThreshold".to_string(), field("lineThreshold")],
                vec!["uptimeSeconds".to_string(), field("uptimeSeconds")],
            ];
            print!(
                "{}",
                render_table(&[Column::left("Field"), Column::left("Value")], &rows)
            );
        }
        Ok(resp) => note_error(&format!("Health check returned {}", resp.status())),
        Err(_) => note_error(&format!("VisionGate is not running on port {}", config.port())),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_hosts_probe_loopback() {
        assert_eq!(probe_host("0.0.0.0"), "127.0.0.1");
        assert_eq!(probe_host("10.1.2.3"), "10.1.2.3");
    }
}

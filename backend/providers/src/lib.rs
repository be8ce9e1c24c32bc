//! OCR provider implementations for VisionGate.

pub mod credentials;
pub mod fixture;
pub mod google;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;

use visiongate_config::VisionGateConfig;
use visiongate_config::defaults::{DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_VISION_ENDPOINT};
use visiongate_core::OcrProvider;

pub use credentials::{resolve_credentials, Credentials};
pub use fixture::FixtureProvider;
pub use google::GoogleVisionProvider;

/// Build the provider named by `provider.kind`, reading credentials from
/// the process environment when the config carries none.
pub async fn build_provider(config: &VisionGateConfig) -> Result<Arc<dyn OcrProvider>> {
    build_provider_with_env(config, &std::env::vars().collect()).await
}

pub async fn build_provider_with_env(
    config: &VisionGateConfig,
    env: &HashMap<String, String>,
) -> Result<Arc<dyn OcrProvider>> {
    let settings = config.provider.clone().unwrap_or_default();

    match config.provider_kind() {
        "google" => {
            let credentials = resolve_credentials(
                settings.api_key.as_deref(),
                settings.access_token.as_deref(),
                env,
            )?;
            let timeout =
                Duration::from_secs(settings.timeout_secs.unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS));
            let endpoint = settings
                .endpoint
                .unwrap_or_else(|| DEFAULT_VISION_ENDPOINT.to_string());

            info!(
                credentials = credentials.kind(),
                endpoint = %endpoint,
                "Registered Google Cloud Vision provider"
            );
            let provider = GoogleVisionProvider::new(credentials, timeout)?
                .with_endpoint(endpoint)
                .with_language_hints(settings.language_hints);
            Ok(Arc::new(provider))
        }
        "fixture" => {
            let provider = match settings.fixture_path.as_deref() {
                Some(path) => FixtureProvider::from_file(Path::new(path)).await?,
                None => FixtureProvider::new(),
            };
            info!(path = ?settings.fixture_path, "Registered fixture OCR provider");
            Ok(Arc::new(provider))
        }
        other => bail!("unknown OCR provider kind '{other}'"),
    }
}

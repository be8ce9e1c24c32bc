//! `visiongate serve`: wire config, provider, and gateway together.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use media::ImageFetcher;
use visiongate_config::{redacted_config, VisionGateConfig};
use visiongate_core::{LineOptions, TextRecognizer};
use visiongate_gateway::{start_server, GatewayState, RateLimiter, RouterOptions};

pub async fn run(config: VisionGateConfig, port: Option<u16>) -> Result<()> {
    debug!(config = %redacted_config(&config), "Effective config");
    let port = port.unwrap_or(config.port());
    let addr: SocketAddr = format!("{}:{}", config.host(), port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host(), port))?;

    let provider = visiongate_providers::build_provider(&config).await?;
    let recognizer = TextRecognizer::new(
        provider,
        LineOptions::with_threshold(config.line_threshold()),
    );

    let fetch_timeout = config
        .provider
        .as_ref()
        .and_then(|p| p.timeout_secs)
        .unwrap_or(visiongate_config::defaults::DEFAULT_PROVIDER_TIMEOUT_SECS);
    let fetcher = ImageFetcher::new(config.max_image_bytes(), Duration::from_secs(fetch_timeout))?;

    let rate_limiter = config.rate_limit_enabled().then(|| {
        RateLimiter::new(
            config.rate_limit_max_requests(),
            config.rate_limit_window_secs(),
        )
    });

    info!(
        addr = %addr,
        provider = recognizer.provider_name(),
        threshold = config.line_threshold(),
        rate_limited = rate_limiter.is_some(),
        "Starting VisionGate gateway"
    );

    let state = GatewayState::new(recognizer, fetcher, config.forward_authorization());
    let options = RouterOptions {
        cors_origins: config.cors_origins().to_vec(),
        rate_limiter,
    };
    start_server(addr, state, options).await
}

//! Main HTTP Gateway Server.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use media::ImageFetcher;
use visiongate_core::TextRecognizer;

use crate::health_api;
use crate::ocr_api;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};

/// Multipart and JSON framing on top of the encoded image size.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Largest request body that can still carry a `max_bytes` image as base64.
fn body_limit_for(max_bytes: usize) -> usize {
    max_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(BODY_OVERHEAD_BYTES)
}

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub recognizer: TextRecognizer,
    pub fetcher: ImageFetcher,
    pub forward_authorization: bool,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(recognizer: TextRecognizer, fetcher: ImageFetcher, forward_authorization: bool) -> Self {
        Self {
            recognizer,
            fetcher,
            forward_authorization,
            started_at: Instant::now(),
        }
    }
}

/// Router-level options that don't belong to request handling.
#[derive(Clone, Default)]
pub struct RouterOptions {
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub rate_limiter: Option<RateLimiter>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Build the gateway router with all routes and layers attached.
pub fn build_router(state: GatewayState, options: RouterOptions) -> Router {
    let body_limit = body_limit_for(state.fetcher.max_bytes());

    let mut ocr_routes = Router::new()
        .route("/api/ocr/upload", post(ocr_api::ocr_upload))
        .route("/api/ocr/url", post(ocr_api::ocr_url))
        .route("/api/ocr/base64", post(ocr_api::ocr_base64))
        .route("/api/ocr/document", post(ocr_api::ocr_document));

    if let Some(limiter) = options.rate_limiter {
        ocr_routes = ocr_routes.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    Router::new()
        .route("/api/health", get(health_api::get_health))
        .merge(ocr_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn spawn_pruner(limiter: RateLimiter) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            let pruned = limiter.prune().await;
            if pruned > 0 {
                tracing::debug!(pruned, "Pruned expired rate-limit windows");
            }
        }
    })
}

/// Starts the main Axum HTTP server for the gateway.
#[instrument(skip(state, options))]
pub async fn start_server(addr: SocketAddr, state: GatewayState, options: RouterOptions) -> Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    let pruner = options.rate_limiter.clone().map(spawn_pruner);
    let app = build_router(state, options);

    info!("Gateway HTTP server listening on {}", addr);
    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    if let Some(pruner) = pruner {
        pruner.abort();
    }
    served?;

    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

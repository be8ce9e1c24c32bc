//! Gateway Rate Limiting Module
//!
//! Fixed-window request counting per client IP.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::request_id::ensure_request_id;
use crate::response::ApiError;

/// Shared fixed-window limiter state.
#[derive(Clone)]
pub struct RateLimiter {
    // client -> (request_count, window_start)
    limits: Arc<RwLock<HashMap<String, (u32, Instant)>>>,
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(60, 60)
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self::with_window(max_requests, Duration::from_secs(window_secs))
    }

    pub fn with_window(max_requests: u32, window: Duration) -> Self {
        Self {
            limits: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Check if a request from the given client is allowed.
    pub async fn check_limit(&self, client: &str) -> bool {
        let mut limits = self.limits.write().await;
        let now = Instant::now();

        let state = limits.entry(client.to_string()).or_insert((0, now));

        if now.duration_since(state.1) > self.window {
            state.0 = 1;
            state.1 = now;
            debug!("Rate limit reset for {}", client);
            true
        } else {
            state.0 = state.0.saturating_add(1);
            if state.0 > self.max_requests {
                warn!("Rate limit exceeded for {}", client);
                false
            } else {
                debug!("Rate limit OK for {} ({}/{})", client, state.0, self.max_requests);
                true
            }
        }
    }

    /// Drop windows that have fully expired.
    pub async fn prune(&self) -> usize {
        let mut limits = self.limits.write().await;
        let before = limits.len();
        let window = self.window;
        limits.retain(|_, (_, start)| start.elapsed() <= window);
        before - limits.len()
    }

    pub async fn tracked_clients(&self) -> usize {
        self.limits.read().await.len()
    }
}

/// Best-effort client identity: first `X-Forwarded-For` hop, then the
/// socket peer address.
pub fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Axum middleware rejecting over-limit clients with 429.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = ensure_request_id(req.extensions_mut());
    let client = client_key(&req);
    if !limiter.check_limit(&client).await {
        return ApiError::too_many_requests()
            .with_request_id(request_id.as_str())
            .into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test]
    async fn test_limit_enforced_per_client() {
        let limiter = RateLimiter::new(2, 60);
        assert!(limiter.check_limit("1.1.1.1").await);
        assert!(limiter.check_limit("1.1.1.1").await);
        assert!(!limiter.check_limit("1.1.1.1").await);
        assert!(limiter.check_limit("2.2.2.2").await);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = RateLimiter::with_window(1, Duration::from_millis(20));
        assert!(limiter.check_limit("c").await);
        assert!(!limiter.check_limit("c").await);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(limiter.check_limit("c").await);
    }

    #[tokio::test]
    async fn test_counter_saturates() {
        let limiter = RateLimiter::new(u32::MAX, 60);
        limiter
            .limits
            .write()
            .await
            .insert("c".to_string(), (u32::MAX, Instant::now()));
        assert!(limiter.check_limit("c").await);
        assert!(limiter.check_limit("c").await);
    }

    #[tokio::test]
    async fn test_prune_expired() {
        let limiter = RateLimiter::with_window(5, Duration::from_millis(10));
        limiter.check_limit("a").await;
        limiter.check_limit("b").await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(limiter.prune().await, 2);
        assert_eq!(limiter.tracked_clients().await, 0);
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&req), "203.0.113.7");

        let bare = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_key(&bare), "unknown");
    }
}

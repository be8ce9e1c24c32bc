//! Per-request correlation id.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, Extensions},
};
use uuid::Uuid;

/// UUID v4 minted once per request and echoed in every response body,
/// success or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Reuse the id an earlier layer stored on the request, or mint one and
/// store it so later layers and the handler agree.
pub fn ensure_request_id(extensions: &mut Extensions) -> RequestId {
    if let Some(id) = extensions.get::<RequestId>() {
        return id.clone();
    }
    let id = RequestId::new();
    extensions.insert(id.clone());
    id
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ensure_request_id(&mut parts.extensions))
    }
}

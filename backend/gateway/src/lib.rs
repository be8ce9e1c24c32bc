//! VisionGate HTTP gateway: OCR endpoints, health, and rate limiting.

pub mod health_api;
pub mod ocr_api;
pub mod rate_limit;
pub mod request_id;
pub mod response;
pub mod server;

pub use rate_limit::RateLimiter;
pub use request_id::RequestId;
pub use response::{ApiError, ApiResponse, NO_TEXT_MESSAGE};
pub use server::{build_router, start_server, GatewayState, RouterOptions};

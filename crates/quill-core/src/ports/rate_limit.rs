//! Rate limiting port.

use async_trait::async_trait;
use std::time::Duration;

/// Per-key admission control. Keys are opaque; the HTTP layer uses client IPs.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request against `key`.
    async fn check(&self, key: &str) -> Result<Admission, RateLimitError>;
}

/// Outcome of counting a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Granted,
    /// Over quota; the earliest retry is `retry_after` from now.
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Admission::Granted)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limiter backend unavailable: {0}")]
    Backend(String),
}

//! Global request rate limiting.

use std::num::NonZeroU32;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;

use crate::AppState;

/// Process-wide token bucket.
///
/// One bucket for the whole service; per-client keying would need
/// `ConnectInfo` plumbing this deployment does not have. Refill rate comes
/// from `resilience.requests_per_second`, capacity from
/// `resilience.burst_size`.
pub struct AppRateLimiter {
    limiter: DefaultDirectRateLimiter,
}

impl std::fmt::Debug for AppRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppRateLimiter").finish_non_exhaustive()
    }
}

impl AppRateLimiter {
    #[must_use]
    pub fn new(requests_per_second: f32, burst_size: u32) -> Self {
        // Sub-1/s rates round up to one request per second.
        let rate = NonZeroU32::new(requests_per_second.max(1.0) as u32).unwrap_or(nonzero!(1u32));
        let burst = NonZeroU32::new(burst_size).unwrap_or(nonzero!(1u32));
        let quota = Quota::per_second(rate).allow_burst(burst);
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Try to take one token.
    #[must_use]
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

/// Reject requests beyond the configured rate with `429 Too Many Requests`.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if state.config.resilience.rate_limit_enabled && !state.rate_limiter.check() {
        tracing::warn!("request rejected by rate limiter");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_honoured_then_exhausted() {
        let limiter = AppRateLimiter::new(1.0, 3);
        for _ in 0..3 {
            assert!(limiter.check());
        }
        assert!(!limiter.check());
    }

    #[test]
    fn test_zero_burst_still_allows_one_in_flight() {
        let limiter = AppRateLimiter::new(1.0, 0);
        assert!(limiter.check());
        assert!(!limiter.check());
    }
}

//! Token-bucket rate limiting for outbound provider calls.
//!
//! One limiter per provider, shared by every worker calling that provider.
//! Token grants are FIFO; acquisition blocks the calling task until a token
//! is available or the caller's timeout elapses.

use crate::shared::errors::{AppError, AppResult};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

type DirectLimiter = GovernorRateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

/// Token-bucket limiter for a single external provider.
pub struct ProviderRateLimiter {
    limiter: DirectLimiter,
    provider_name: String,
}

impl ProviderRateLimiter {
    /// Create a limiter replenishing `permits` tokens per `period`, holding
    /// at most `burst` unused tokens.
    pub fn new(provider_name: &str, permits: u32, period: Duration, burst: u32) -> Self {
        // Convert to a per-token replenish interval
        let interval = if permits > 0 {
            period / permits
        } else {
            Duration::MAX
        };

        let burst = NonZeroU32::new(burst.max(1)).unwrap();
        let quota = Quota::with_period(interval)
            .expect("non-zero replenish interval")
            .allow_burst(burst);

        Self {
            limiter: GovernorRateLimiter::direct(quota),
            provider_name: provider_name.to_string(),
        }
    }

    /// Wait for a token, failing with `RateLimitTimeout` if none is granted
    /// within `timeout`.
    pub async fn acquire(&self, timeout: Duration) -> AppResult<()> {
        match tokio::time::timeout(timeout, self.limiter.until_ready()).await {
            Ok(()) => Ok(()),
            Err(_) => Err(AppError::RateLimitTimeout(format!(
                "{}: no token granted within {:?}",
                self.provider_name, timeout
            ))),
        }
    }

    /// Wait for a token without a deadline (queue-level throttling).
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Check if a token is available right now without consuming wait time.
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Provider this limiter guards
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }
}

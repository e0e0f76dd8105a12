use std::num::NonZeroU32;
use std::time::Duration;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};

/// Minimum spacing between calls from one client instance. Each row's client
/// gets its own limiter, so pacing is per account, not global.
pub const EXCHANGE_CALL_SPACING: Duration = Duration::from_millis(100);

pub struct RateLimiter {
    limiter: GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        let quota = Quota::with_period(min_interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::new(10).unwrap()))
            .allow_burst(NonZeroU32::new(1).unwrap());
        Self {
            limiter: GovernorRateLimiter::direct(quota),
        }
    }

    /// Suspends until at least `min_interval` has passed since the previous
    /// acquisition.
    pub async fn throttle(&self) {
        self.limiter.until_ready().await;
    }

    #[cfg(test)]
    fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_passes_second_is_paced() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn throttle_waits_out_the_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(50));

        limiter.throttle().await;
        let start = std::time::Instant::now();
        limiter.throttle().await;

        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Paces outbound requests so the source's request budget is respected.
///
/// `limit` requests are spread across each `window`; callers wait in
/// [`acquire`](Self::acquire) until budget is available instead of queueing.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<DirectRateLimiter>,
}

impl RequestThrottle {
    pub fn new(window: Duration, limit: u32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(window, limit))),
        }
    }

    /// Suspends until one unit of rate budget is available.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Non-blocking probe; consumes budget when it succeeds.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

fn quota_from_window(window: Duration, limit: u32) -> Quota {
    let safe_limit = limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("limit is clamped to at least one");

    let seconds_per_cell = (window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_covers_the_configured_limit() {
        let throttle = RequestThrottle::new(Duration::from_secs(60), 2);

        assert!(throttle.try_acquire());
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[test]
    fn zero_limit_still_admits_one_request() {
        let throttle = RequestThrottle::new(Duration::from_secs(60), 0);
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[tokio::test]
    async fn acquire_waits_for_budget_instead_of_failing() {
        let throttle = RequestThrottle::new(Duration::from_millis(40), 1);

        throttle.acquire().await;
        // Budget is spent; the second acquire must wait out the window.
        let start = std::time::Instant::now();
        throttle.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}

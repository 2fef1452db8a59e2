//! Request pacing for the upstream API budget.

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;

/// Gate awaited before every remote call to the stats API.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn wait(&self);
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Fixed-interval gate: the first call passes immediately, each later call
/// waits until `interval` has elapsed since the previous one.
///
/// Clones share one limiter, so a single instance can pace several fetchers.
#[derive(Clone)]
pub struct GovernorPacer {
    limiter: Arc<DirectLimiter>,
    interval: Duration,
}

impl GovernorPacer {
    /// Returns `None` for a zero interval.
    pub fn new(interval: Duration) -> Option<Self> {
        let quota = Quota::with_period(interval)?;
        Some(Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Pacer for GovernorPacer {
    async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(GovernorPacer::new(Duration::ZERO).is_none());
    }

    #[tokio::test]
    async fn test_calls_are_spaced_by_interval() {
        let pacer = GovernorPacer::new(Duration::from_millis(40)).unwrap();
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(40));
        pacer.wait().await;
        pacer.wait().await;
        // Two gaps after the free first call.
        assert!(start.elapsed() >= Duration::from_millis(75));
    }
}

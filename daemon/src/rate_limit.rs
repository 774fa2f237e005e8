use governor::{
    clock::FakeRelativeClock,
    middleware::NoOpMiddleware,
    state::InMemoryState,
    state::NotKeyed,
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use tokio::time::{Duration, Instant};

/// Token bucket over recognizer restarts.
///
/// The fixed restart delay spaces out single restarts; this catches a backend
/// that ends every session immediately and would otherwise restart forever.
/// The bucket runs on the caller's clock: each check moves a relative clock up
/// to the `now` it is given, so refills follow tokio time, paused or not.
pub struct RestartLimiter {
    limiter: RateLimiter<
        NotKeyed,
        InMemoryState,
        FakeRelativeClock,
        NoOpMiddleware<<FakeRelativeClock as governor::clock::Clock>::Instant>,
    >,
    clock: FakeRelativeClock,
    origin: Instant,
    elapsed: Duration,
}

impl RestartLimiter {
    /// Zero values are clamped to one.
    pub fn new(restarts_per_second: u32, burst_capacity: u32, origin: Instant) -> Self {
        let quota = Quota::per_second(Self::non_zero(restarts_per_second))
            .allow_burst(Self::non_zero(burst_capacity));
        let clock = FakeRelativeClock::default();

        Self {
            limiter: RateLimiter::direct_with_clock(quota, &clock),
            clock,
            origin,
            elapsed: Duration::ZERO,
        }
    }

    /// Takes a token if one is available at `now`; never waits. Instants
    /// earlier than a previous check do not move the clock back.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.origin);
        if elapsed > self.elapsed {
            self.clock.advance(elapsed - self.elapsed);
            self.elapsed = elapsed;
        }
        self.limiter.check().is_ok()
    }

    fn non_zero(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value.max(1)).unwrap_or(NonZeroU32::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_limiter_allows_first_restart() {
        let now = Instant::now();
        let mut limiter = RestartLimiter::new(5, 10, now);
        assert!(limiter.try_acquire(now));
    }

    #[test]
    fn test_restart_limiter_burst() {
        let now = Instant::now();
        let mut limiter = RestartLimiter::new(1, 4, now);

        for _ in 0..4 {
            assert!(limiter.try_acquire(now), "Burst capacity should allow 4 restarts");
        }

        assert!(
            !limiter.try_acquire(now),
            "Should be throttled after burst exhausted"
        );
    }

    #[test]
    fn test_restart_limiter_zero_values_are_clamped() {
        let now = Instant::now();
        let mut limiter = RestartLimiter::new(0, 0, now);
        assert!(limiter.try_acquire(now));
        assert!(!limiter.try_acquire(now));
    }

    #[test]
    fn test_restart_limiter_refills_on_caller_clock() {
        let start = Instant::now();
        let mut limiter = RestartLimiter::new(1, 1, start);
        assert!(limiter.try_acquire(start));
        assert!(!limiter.try_acquire(start + Duration::from_millis(500)));

        assert!(limiter.try_acquire(start + Duration::from_secs(1)));
        assert!(!limiter.try_acquire(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_restart_limiter_ignores_earlier_instants() {
        let start = Instant::now();
        let mut limiter = RestartLimiter::new(1, 1, start);
        assert!(limiter.try_acquire(start + Duration::from_secs(5)));
        assert!(!limiter.try_acquire(start));
        assert!(limiter.try_acquire(start + Duration::from_secs(6)));
    }
}

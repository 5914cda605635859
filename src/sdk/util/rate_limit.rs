use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Spaces blocking calls at least `interval` apart. Cloning shares the budget.
#[derive(Clone)]
pub struct Limiter {
    inner: Option<Arc<DirectLimiter>>,
    clock: DefaultClock,
}

impl Limiter {
    /// One call per `interval`, no bursts. A zero interval disables limiting.
    pub fn with_interval(interval: Duration) -> Self {
        let inner = Quota::with_period(interval).map(|quota| Arc::new(RateLimiter::direct(quota)));
        Self {
            inner,
            clock: DefaultClock::default(),
        }
    }

    pub fn unlimited() -> Self {
        Self {
            inner: None,
            clock: DefaultClock::default(),
        }
    }

    pub fn from_interval(interval: Option<Duration>) -> Self {
        match interval {
            Some(interval) => Self::with_interval(interval),
            None => Self::unlimited(),
        }
    }

    pub fn is_limited(&self) -> bool {
        self.inner.is_some()
    }

    /// Blocks until the next call is allowed.
    pub fn wait(&self) {
        let Some(limiter) = &self.inner else {
            return;
        };
        while let Err(not_until) = limiter.check() {
            let delay = not_until.wait_time_from(self.clock.now());
            log::debug!("Rate limit reached, sleeping {:?}", delay);
            thread::sleep(delay);
        }
    }
}

impl std::fmt::Debug for Limiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Limiter")
            .field("limited", &self.is_limited())
            .finish()
    }
}

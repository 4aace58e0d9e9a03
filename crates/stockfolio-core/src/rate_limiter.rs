//! Minimum-spacing rate limiter shared by every outbound provider call.

use std::fmt;
use std::num::NonZeroU32;
use std::ops::Add;
use std::time::Duration;

use governor::clock::{Clock, Reference};
use governor::middleware::NoOpMiddleware;
use governor::nanos::Nanos;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::Quota;
use tokio::time::Instant;
use tracing::debug;

type SpacingLimiter =
    governor::RateLimiter<NotKeyed, InMemoryState, TokioClock, NoOpMiddleware<TokioInstant>>;

/// Enforces at least `60s / requests_per_minute` between consecutive requests.
///
/// One instance is meant to be shared (via `Arc`) by every client talking to
/// the same provider quota. The quota allows a burst of one, so concurrent
/// callers are admitted one spacing apart as well.
pub struct RateLimiter {
    delay: Duration,
    limiter: SpacingLimiter,
}

impl RateLimiter {
    /// Quota of zero is treated as one request per minute.
    pub fn new(requests_per_minute: u32) -> Self {
        let delay = Duration::from_secs(60) / requests_per_minute.max(1);
        Self {
            delay,
            limiter: governor::RateLimiter::direct_with_clock(spacing_quota(delay), &TokioClock),
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until the limiter admits one more request.
    ///
    /// Never fails. A caller dropped while waiting consumes no slot.
    pub async fn enforce(&self) {
        while let Err(not_until) = self.limiter.check() {
            let wait = not_until.wait_time_from(TokioClock.now());
            debug!(
                wait_ms = wait.as_millis() as u64,
                "rate limiter delaying request"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RateLimiter")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// One cell per `delay`, no burst.
fn spacing_quota(delay: Duration) -> Quota {
    Quota::with_period(delay)
        .unwrap_or_else(|| Quota::per_minute(NonZeroU32::MIN))
        .allow_burst(NonZeroU32::MIN)
}

/// Reads time from tokio so a paused test runtime drives the limiter.
#[derive(Debug, Clone, Copy, Default)]
struct TokioClock;

impl Clock for TokioClock {
    type Instant = TokioInstant;

    fn now(&self) -> Self::Instant {
        TokioInstant(Instant::now())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TokioInstant(Instant);

impl Add<Nanos> for TokioInstant {
    type Output = Self;

    fn add(self, other: Nanos) -> Self {
        Self(self.0 + Duration::from(other))
    }
}

impl Reference for TokioInstant {
    fn duration_since(&self, earlier: Self) -> Nanos {
        self.0.saturating_duration_since(earlier.0).into()
    }

    fn saturating_sub(&self, duration: Nanos) -> Self {
        self.0
            .checked_sub(Duration::from(duration))
            .map_or(*self, Self)
    }
}

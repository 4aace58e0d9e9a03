//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::StockError;

/// Configuration for the retry loop wrapped around each provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first one included. Zero behaves like one.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub initial_delay: Duration,
    /// Multiplier applied to the wait after every failed attempt.
    pub backoff_factor: f64,
    /// Upper bound for a single wait.
    pub max_delay: Duration,
    /// Whether to apply random jitter (+/- 50%) to each wait.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1_000),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(60),
            jitter: false,
        }
    }
}

impl RetryConfig {
    pub fn exponential(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            backoff_factor: 1.0,
            ..Self::default()
        }
    }

    /// A single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait before retry number `retry` (0-based), before jitter.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let mut delay = self.initial_delay.min(self.max_delay);
        for _ in 0..retry {
            delay = scale(delay, self.backoff_factor, self.max_delay);
        }
        delay
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Per-invocation retry bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryState {
    pub attempt: u32,
    pub delay: Duration,
}

impl RetryState {
    fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            delay: config.initial_delay.min(config.max_delay),
        }
    }

    fn advance(&mut self, config: &RetryConfig) {
        self.delay = scale(self.delay, config.backoff_factor, config.max_delay);
    }
}

/// Runs `operation` until it succeeds, fails with a non-transient error, or
/// runs out of attempts.
///
/// The last error is returned unchanged. Cancelling `cancel` stops the loop
/// before the next attempt or during a backoff wait.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, StockError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StockError>>,
{
    let mut state = RetryState::new(config);

    loop {
        if cancel.is_cancelled() {
            return Err(StockError::cancelled());
        }

        state.attempt += 1;
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !error.is_transient() || state.attempt >= config.attempts() {
            return Err(error);
        }

        let wait = if config.jitter {
            jittered(state.delay)
        } else {
            state.delay
        };
        warn!(
            attempt = state.attempt,
            max_attempts = config.attempts(),
            wait_ms = wait.as_millis() as u64,
            error = %error,
            "provider request failed; retrying"
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(StockError::cancelled()),
            _ = tokio::time::sleep(wait) => {}
        }

        state.advance(config);
    }
}

fn scale(delay: Duration, factor: f64, max: Duration) -> Duration {
    let seconds = delay.as_secs_f64() * factor;
    if seconds.is_finite() && seconds >= 0.0 {
        Duration::from_secs_f64(seconds.min(max.as_secs_f64()))
    } else {
        max
    }
}

fn jittered(delay: Duration) -> Duration {
    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
    let random_offset = fastrand::u64(0..=(jitter_ms * 2));
    let total_ms = delay.as_millis() as i64 + (random_offset as i64 - jitter_ms as i64);
    Duration::from_millis(total_ms.max(0) as u64)
}

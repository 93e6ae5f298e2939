//! Exponential backoff retry for outbound platform calls
//!
//! One shared policy: up to 3 retries (4 attempts total) with
//! `base × 2^attempt` delays. Only transient failures are retried: 429
//! (honoring a server-provided `Retry-After`), 5xx, and transport errors.
//! Permanent failures propagate immediately, and exhausting the retries
//! re-raises the last error so the caller decides whether the failure is
//! isolated or fatal.
//!
//! Implemented as an explicit combinator over a closure rather than
//! recursion, so the call stack stays flat however many attempts run.

use std::future::Future;
use std::time::Duration;

use shared::ApiError;

/// Retry policy for one class of outbound call
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Retries after the initial attempt
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Cap for exponential growth
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Stock pushes: 1s, 2s, 4s
    pub const STOCK_PUSH: Self = Self {
        max_retries: 3,
        base_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(30),
    };

    /// Order polls: 2s, 4s, 8s
    pub const ORDER_POLL: Self = Self {
        max_retries: 3,
        base_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(60),
    };

    /// Delay before retry number `attempt` (0-indexed): `base × 2^attempt`,
    /// capped at `max_delay`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Run `operation`, retrying transient failures per `config`.
///
/// A 429 with `Retry-After` sleeps the server-requested delay instead of
/// the computed backoff for that attempt.
pub async fn execute<T, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                attempt += 1;
                if attempt > config.max_retries {
                    return Err(e);
                }
                let delay = e
                    .retry_after
                    .unwrap_or_else(|| config.delay_for_attempt(attempt - 1));
                tracing::warn!(
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient API failure, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

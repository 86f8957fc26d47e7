//! Bounded retries with exponential backoff and jitter.

use std::thread::sleep;
use std::time::Duration;

use tracing::warn;

use crate::error::GenerationError;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Server-provided `Retry-After` values above this are capped
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` means a single attempt
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES, base_delay: DEFAULT_BASE_DELAY }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// No waiting between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO)
    }

    /// Backoff before retry `attempt` (1-based): `base · 2^(attempt-1)`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    fn jitter(&self) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        if base_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(0..=base_ms))
    }

    /// Run `op`, retrying transient failures up to `max_retries` times.
    /// Permanent failures and the last transient failure are returned unchanged.
    pub fn run<T, F>(&self, mut op: F) -> Result<T, GenerationError>
    where
        F: FnMut() -> Result<T, GenerationError>,
    {
        let mut attempt = 0u32;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let mut delay = self.delay_for_attempt(attempt) + self.jitter();
                    if let GenerationError::RateLimited { retry_after_secs: Some(secs) } = &err {
                        delay = delay.max(Duration::from_secs(*secs).min(MAX_RETRY_AFTER));
                    }
                    warn!(attempt, max = self.max_retries, error = %err, delay_ms = delay.as_millis() as u64, "retrying generation request");
                    if !delay.is_zero() {
                        sleep(delay);
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

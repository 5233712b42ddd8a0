//! Retry policy with exponential backoff.

use crate::Error;
use std::time::Duration;

/// Budget and pacing for transient-failure retries.
///
/// Defaults mirror the portal front end: three attempts total, doubling
/// delays of 1s then 2s between them.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single attempt, no backoff. For calls that must not be replayed
    /// automatically, such as credential submissions.
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before the attempt following attempt `attempt` (1-based):
    /// `base * 2^(attempt-1)`, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as u64;
        let cap = self.max_delay.as_millis() as u64;
        let exp = attempt.saturating_sub(1).min(63);
        let delay = base.saturating_mul(1u64 << exp).min(cap);
        Duration::from_millis(delay)
    }

    /// Whether attempt `attempt` (1-based) may be followed by another, and if
    /// so, after how long. Terminal errors and an exhausted budget both stop
    /// the loop.
    pub fn should_retry(&self, attempt: u32, error: &Error) -> Option<Duration> {
        if attempt >= self.max_attempts || !error.is_retryable() {
            return None;
        }
        Some(self.backoff(attempt))
    }
}

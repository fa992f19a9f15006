//! How many times to try, how long to wait for each try, how long to back off.

use std::time::Duration;

/// Retry/timeout policy for plan generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Upper bound on a single remote call.
    pub attempt_timeout: Duration,
    /// Wait after the first failed attempt; doubles after each further failure.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            attempt_timeout: Duration::from_secs(120), // 2 minutes
            backoff_base: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (1-based): `base * 2^(attempt - 1)`,
    /// so 2s, 4s, 8s... with the default base.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff_base.saturating_mul(factor)
    }

    /// Every backoff this policy can produce, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|a| self.backoff_after(a)).collect()
    }
}

//! Bounded exponential backoff for reconnect scheduling.

use std::time::Duration;

use folio_common::defaults;

/// Reconnect policy: `min(base * 2^(attempt - 1), cap)`, at most
/// `max_attempts` consecutive retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(defaults::BACKOFF_BASE_MS),
            cap: Duration::from_millis(defaults::BACKOFF_CAP_MS),
            max_attempts: defaults::BACKOFF_MAX_ATTEMPTS,
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.cap)
    }
}

/// Attempt counter driven by a [`BackoffPolicy`].
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempts: u32,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn can_retry(&self) -> bool {
        self.attempts < self.policy.max_attempts
    }

    /// Claim the next retry. Returns the attempt number and its delay, or
    /// `None` once the budget is spent.
    pub fn next_retry(&mut self) -> Option<(u32, Duration)> {
        if !self.can_retry() {
            return None;
        }
        self.attempts += 1;
        Some((self.attempts, self.policy.delay_for(self.attempts)))
    }

    /// Called after a successful open.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

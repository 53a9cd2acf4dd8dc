//! Reconnect policy with bounded, deterministic exponential back-off.

use std::time::Duration;

use mc_domain::config::RetryConfig;

/// Controls how a connect sequence retries after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectBackoff {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between attempts (cap).
    pub max_delay: Duration,
    /// Retries allowed after the first failure; the sequence is exhausted
    /// once this many delays have been handed out.
    pub max_attempts: u32,
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            max_attempts: 29,
        }
    }
}

impl From<&RetryConfig> for ReconnectBackoff {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            initial_delay: cfg.base_delay(),
            max_delay: cfg.max_delay(),
            max_attempts: cfg.max_attempts,
        }
    }
}

impl ReconnectBackoff {
    /// Delay for the given attempt number (0-indexed):
    /// `min(initial_delay * 2^attempt, max_delay)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        1u32.checked_shl(attempt)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Whether the given attempt number has used up the budget.
    pub fn should_give_up(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }

    /// Start a fresh delay sequence for one connect sequence.
    pub fn sequence(&self) -> RetrySequence {
        RetrySequence {
            policy: self.clone(),
            attempt: 0,
        }
    }
}

/// Stateful delay generator. Never reused across connect sequences.
#[derive(Debug, Clone)]
pub struct RetrySequence {
    policy: ReconnectBackoff,
    attempt: u32,
}

impl RetrySequence {
    /// The next back-off delay, or `None` once the budget is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.policy.should_give_up(self.attempt) {
            return None;
        }
        let delay = self.policy.delay_for_attempt(self.attempt);
        self.attempt += 1;
        Some(delay)
    }

    /// Delays handed out so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

//! Timeout configuration for options fetches.

use std::time::Duration;

/// Timeout configuration for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Limit for a single provider call.
    pub attempt: Duration,
    /// Limit for all attempts together, backoff included.
    pub total: Duration,
}

impl TimeoutConfig {
    pub fn new(attempt: Duration, total: Duration) -> Self {
        Self { attempt, total }
    }

    /// Create from a single total timeout; each attempt gets half of it.
    pub fn from_total(total: Duration) -> Self {
        Self {
            attempt: total / 2,
            total,
        }
    }

    /// Time left for the next attempt after `elapsed`.
    pub fn next_attempt_budget(&self, elapsed: Duration) -> Duration {
        self.attempt.min(self.total.saturating_sub(elapsed))
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            attempt: Duration::from_millis(500),
            total: Duration::from_millis(1500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_budget_shrinks_with_elapsed() {
        let config = TimeoutConfig::new(Duration::from_millis(400), Duration::from_millis(1000));
        assert_eq!(config.next_attempt_budget(Duration::ZERO), Duration::from_millis(400));
        assert_eq!(config.next_attempt_budget(Duration::from_millis(800)), Duration::from_millis(200));
        assert_eq!(config.next_attempt_budget(Duration::from_secs(2)), Duration::ZERO);
    }

    #[test]
    fn test_from_total() {
        let config = TimeoutConfig::from_total(Duration::from_secs(1));
        assert_eq!(config.attempt, Duration::from_millis(500));
    }
}

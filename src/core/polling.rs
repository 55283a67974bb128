//! Polling budgets for long-running remote operations
//!
//! A `PollPolicy` pairs the wait between two attempts with a wall-clock budget
//! measured from the start of the operation being polled.

use crate::core::validation::ValidationError;
use std::time::Duration;

/// Interval and timeout budget for one polled operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub const fn from_secs(interval: u64, timeout: u64) -> Self {
        Self::new(Duration::from_secs(interval), Duration::from_secs(timeout))
    }

    /// A budget must leave room for at least one wait before it runs out
    pub fn validate(&self, name: &str) -> Result<(), ValidationError> {
        if self.interval.is_zero() {
            return Err(ValidationError::new(&format!(
                "{} polling interval must be greater than zero",
                name
            )));
        }
        if self.timeout <= self.interval {
            return Err(ValidationError::new(&format!(
                "{} timeout ({:?}) must exceed its polling interval ({:?})",
                name, self.timeout, self.interval
            )));
        }
        Ok(())
    }

    pub fn is_exhausted(&self, elapsed: Duration) -> bool {
        elapsed >= self.timeout
    }

    /// Wait before the next attempt, clipped to what is left of the budget.
    /// `None` once the budget is spent.
    pub fn next_delay(&self, elapsed: Duration) -> Option<Duration> {
        let remaining = self.timeout.checked_sub(elapsed)?;
        if remaining.is_zero() {
            return None;
        }
        Some(self.interval.min(remaining))
    }
}

//! Watch configuration
//!
//! Poll interval and attempt budget for a single watch. Together they bound
//! how long a watch waits: roughly `max_attempts * interval` plus the
//! latency of each status fetch.

use std::time::Duration;

use crate::error::{Result, WatchError};

/// Default delay between two polls of the same submission
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Default number of polls before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Polling parameters of one watch
///
/// Always valid: the interval is non-zero and at least one poll is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    interval: Duration,
    max_attempts: u32,
}

impl WatchConfig {
    /// Creates a validated configuration
    ///
    /// # Errors
    /// `InvalidConfig` when `interval` is zero or `max_attempts` is zero
    pub fn new(interval: Duration, max_attempts: u32) -> Result<Self> {
        if interval.is_zero() {
            return Err(WatchError::InvalidConfig(
                "poll interval must be greater than 0".to_string(),
            ));
        }

        if max_attempts == 0 {
            return Err(WatchError::InvalidConfig(
                "max attempts must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            interval,
            max_attempts,
        })
    }

    /// Returns a copy with a different interval
    pub fn with_interval(self, interval: Duration) -> Result<Self> {
        Self::new(interval, self.max_attempts)
    }

    /// Returns a copy with a different attempt budget
    pub fn with_max_attempts(self, max_attempts: u32) -> Result<Self> {
        Self::new(self.interval, max_attempts)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound on time spent waiting between polls
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

//! Poll interval and timeout configuration

use std::time::Duration;

/// Interval used when none is configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wait configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaitOptions {
    /// Pause between two polls
    pub interval: Duration,
    /// Elapsed time after which a failed poll ends the wait
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        WaitOptions {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl WaitOptions {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        WaitOptions { interval, timeout }
    }

    /// Both durations in milliseconds
    pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
    }

    /// Tight polling for in-process state
    pub fn fast() -> Self {
        WaitOptions {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(1),
        }
    }

    /// Slow polling for external services
    pub fn patient() -> Self {
        WaitOptions {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upper bound on how long a wait can take: the timeout plus one interval
    pub fn worst_case(&self) -> Duration {
        self.timeout.saturating_add(self.interval)
    }
}

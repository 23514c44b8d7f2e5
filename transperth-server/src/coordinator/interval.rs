//! Refresh interval.

use std::time::Duration;

/// Default seconds between refreshes.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 300;

/// Shortest interval accepted; the planner is a public website.
pub const MIN_SCAN_INTERVAL_SECS: u64 = 60;

/// Seconds between refresh cycles, never below [`MIN_SCAN_INTERVAL_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanInterval(u64);

impl ScanInterval {
    /// Build an interval, raising anything shorter than the minimum.
    pub fn new(secs: u64) -> Self {
        Self(secs.max(MIN_SCAN_INTERVAL_SECS))
    }

    pub fn secs(self) -> u64 {
        self.0
    }

    pub fn duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for ScanInterval {
    fn default() -> Self {
        Self(DEFAULT_SCAN_INTERVAL_SECS)
    }
}

impl From<u64> for ScanInterval {
    fn from(secs: u64) -> Self {
        Self::new(secs)
    }
}

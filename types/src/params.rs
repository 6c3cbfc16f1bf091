//! Timings of the scan loop.

use crate::KioskTypesError;
use serde::{Deserialize, Serialize};

/// All durations that drive the scan loop, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanTimings {
    /// Cadence of capture attempts while idle.
    pub scan_interval_ms: u64,

    /// Delay before an outstanding attempt is shown as "processing".
    pub grace_ms: u64,

    /// Dwell time on a granted/denied verdict before returning to idle.
    pub settle_ms: u64,

    /// Period of the display clock. Independent of scan timing.
    pub clock_tick_ms: u64,
}

impl ScanTimings {
    pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 500;
    pub const DEFAULT_GRACE_MS: u64 = 400;
    pub const DEFAULT_SETTLE_MS: u64 = 3000;
    pub const DEFAULT_CLOCK_TICK_MS: u64 = 1000;

    /// Reject timings that would make a timer fire continuously.
    pub fn validate(&self) -> Result<(), KioskTypesError> {
        let fields = [
            ("scan_interval_ms", self.scan_interval_ms),
            ("grace_ms", self.grace_ms),
            ("settle_ms", self.settle_ms),
            ("clock_tick_ms", self.clock_tick_ms),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(KioskTypesError::ZeroTiming { name });
            }
        }
        Ok(())
    }
}

impl Default for ScanTimings {
    fn default() -> Self {
        Self {
            scan_interval_ms: Self::DEFAULT_SCAN_INTERVAL_MS,
            grace_ms: Self::DEFAULT_GRACE_MS,
            settle_ms: Self::DEFAULT_SETTLE_MS,
            clock_tick_ms: Self::DEFAULT_CLOCK_TICK_MS,
        }
    }
}

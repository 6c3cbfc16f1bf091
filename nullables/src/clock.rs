//! Nullable clock: deterministic time for testing.

use kiosk_types::Millis;
use std::cell::Cell;

/// A deterministic monotonic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_ms: u64) -> Self {
        Self {
            current: Cell::new(initial_ms),
        }
    }

    /// Get the current time.
    pub fn now(&self) -> Millis {
        Millis::new(self.current.get())
    }

    /// Advance time by a number of milliseconds and return the new time.
    pub fn advance(&self, ms: u64) -> Millis {
        self.current.set(self.current.get() + ms);
        self.now()
    }

    /// Set the time to a specific value.
    pub fn set(&self, ms: u64) {
        self.current.set(ms);
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}

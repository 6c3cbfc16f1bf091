//! Monotonic time used by the scan loop.
//!
//! `Millis` counts milliseconds since the kiosk session was mounted. It is
//! never derived from wall-clock time, so tests can drive the loop with a
//! fake clock and get identical traces on every run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A point on the session's monotonic timeline, in milliseconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Millis(u64);

impl Millis {
    /// The instant the session was mounted.
    pub const ZERO: Self = Self(0);

    pub fn new(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since this instant (relative to `now`).
    pub fn elapsed_since(&self, now: Millis) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl Add<u64> for Millis {
    type Output = Millis;

    fn add(self, ms: u64) -> Millis {
        Millis(self.0.saturating_add(ms))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_saturates_when_now_is_earlier() {
        assert_eq!(Millis::new(50).elapsed_since(Millis::new(10)), 0);
        assert_eq!(Millis::new(10).elapsed_since(Millis::new(50)), 40);
    }

    #[test]
    fn addition_saturates() {
        assert_eq!(Millis::new(u64::MAX) + 1, Millis::new(u64::MAX));
        assert_eq!(Millis::ZERO + 500, Millis::new(500));
    }
}

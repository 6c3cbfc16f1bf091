//! State enums for the scan loop and the status panel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The state of the scan-and-verify loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanState {
    /// Waiting for the next capture. The scheduler only fires here.
    #[default]
    Idle,
    /// A capture was accepted and submitted; the grace window is still running.
    Pending,
    /// Still awaiting the verdict after the grace window elapsed.
    Processing,
    /// Entry granted; reverts to Idle after the settle duration.
    Granted,
    /// Entry denied; reverts to Idle after the settle duration.
    Denied,
}

impl ScanState {
    /// Whether a verification request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Whether this state is dwelling on a verdict.
    pub fn is_settling(&self) -> bool {
        matches!(self, Self::Granted | Self::Denied)
    }

    /// What the status panel shows for this state.
    ///
    /// Pending renders as Idle so fast responses never flash the busy indicator.
    pub fn display_phase(&self) -> DisplayPhase {
        match self {
            Self::Idle | Self::Pending => DisplayPhase::Idle,
            Self::Processing => DisplayPhase::Processing,
            Self::Granted => DisplayPhase::Granted,
            Self::Denied => DisplayPhase::Denied,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The phase rendered on the status panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayPhase {
    #[default]
    Idle,
    Processing,
    Granted,
    Denied,
}

impl DisplayPhase {
    /// The scan-target overlay is only drawn while idle.
    pub fn shows_scan_overlay(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Fixed panel text for this phase (the denial reason is appended separately).
    pub fn headline(&self) -> &'static [&'static str] {
        match self {
            Self::Idle => &["Hello, please", "verify Your QR", "code above"],
            Self::Processing => &["Verifying...", "Please wait"],
            Self::Granted => &["Access", "Granted"],
            Self::Denied => &["Access", "Denied"],
        }
    }
}

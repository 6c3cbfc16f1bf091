use kiosk_types::ScanState;
use thiserror::Error;

use crate::lock::AttemptId;

/// A scan-loop event that does not match the current state.
///
/// These never reach the user: the session logs them and leaves the state
/// untouched. They exist so the machine can refuse illegal edges explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("attempt lock is held by {held_by}")]
    LockHeld { held_by: AttemptId },

    #[error("attempt {attempt} does not hold the lock (holder: {held_by:?})")]
    LockNotHeld {
        attempt: AttemptId,
        held_by: Option<AttemptId>,
    },

    #[error("`{event}` is not valid in state {from}")]
    InvalidTransition { from: ScanState, event: &'static str },

    #[error("response for attempt {attempt} does not match the outstanding attempt {current:?}")]
    StaleAttempt {
        attempt: AttemptId,
        current: Option<AttemptId>,
    },
}

#[derive(Debug, Error)]
pub enum KioskError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid timings: {0}")]
    Timings(#[from] kiosk_types::KioskTypesError),

    #[error("metrics error: {0}")]
    Metrics(String),
}

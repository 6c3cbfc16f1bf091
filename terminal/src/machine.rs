//! Scan state machine.
//!
//! Owns the current [`ScanState`], the displayed message and the
//! [`AttemptLock`]. Every transition is an explicit method that either
//! succeeds or returns a [`TransitionError`] without touching state, so no
//! state is reachable except through the edges below:
//!
//! ```text
//! Idle ──capture accepted──▶ Pending ──grace elapsed──▶ Processing
//!   ▲                          │                           │
//!   │                          ├──── MalformedInput ───────┤──▶ Idle (lock released)
//!   │                          └──── any other outcome ────┘──▶ Granted | Denied
//!   └────────────── settle elapsed (lock released) ◀────────────────┘
//! ```
//!
//! The machine knows nothing about time; the session arms and cancels the
//! timers that drive it.

use kiosk_types::{ScanState, VerificationOutcome};

use crate::error::TransitionError;
use crate::lock::{AttemptId, AttemptLock};

/// What the session must do after an outcome has been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Entered Granted/Denied; arm the settle timer. The lock stays held.
    Settle,
    /// Returned straight to Idle; the lock is already released.
    Released,
}

#[derive(Debug, Default)]
pub struct ScanMachine {
    state: ScanState,
    lock: AttemptLock,
    message: Option<String>,
    attempts_started: u64,
}

impl ScanMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Message shown alongside a denial.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_held()
    }

    /// The attempt holding the lock, if any.
    pub fn current_attempt(&self) -> Option<AttemptId> {
        self.lock.holder()
    }

    pub fn attempts_started(&self) -> u64 {
        self.attempts_started
    }

    /// Whether a scheduler tick may start an attempt right now.
    pub fn can_start_attempt(&self) -> bool {
        self.state == ScanState::Idle && !self.lock.is_held()
    }

    /// `Idle → Pending`: a capture was accepted for submission.
    pub fn begin_attempt(&mut self) -> Result<AttemptId, TransitionError> {
        if self.state != ScanState::Idle {
            return Err(TransitionError::InvalidTransition {
                from: self.state,
                event: "capture_accepted",
            });
        }
        let attempt = AttemptId::new(self.attempts_started + 1);
        self.lock.acquire(attempt)?;
        self.attempts_started += 1;
        self.state = ScanState::Pending;
        self.message = None;
        Ok(attempt)
    }

    /// `Pending → Processing`: the grace window elapsed without a verdict.
    pub fn grace_elapsed(&mut self) -> Result<(), TransitionError> {
        if self.state != ScanState::Pending {
            return Err(TransitionError::InvalidTransition {
                from: self.state,
                event: "grace_elapsed",
            });
        }
        self.state = ScanState::Processing;
        Ok(())
    }

    /// `Pending/Processing → Granted | Denied | Idle` for the outstanding attempt.
    pub fn apply_outcome(
        &mut self,
        attempt: AttemptId,
        outcome: &VerificationOutcome,
    ) -> Result<Resolution, TransitionError> {
        if self.lock.holder() != Some(attempt) {
            return Err(TransitionError::StaleAttempt {
                attempt,
                current: self.lock.holder(),
            });
        }
        if !self.state.is_in_flight() {
            return Err(TransitionError::InvalidTransition {
                from: self.state,
                event: "outcome",
            });
        }

        if !outcome.settles() {
            self.lock.release(attempt)?;
            self.state = ScanState::Idle;
            self.message = None;
            return Ok(Resolution::Released);
        }

        self.state = if outcome.is_granted() {
            ScanState::Granted
        } else {
            ScanState::Denied
        };
        self.message = outcome.display_message();
        Ok(Resolution::Settle)
    }

    /// `Granted/Denied → Idle`: the settle duration elapsed.
    ///
    /// Returns the attempt whose lock was released.
    pub fn settle_elapsed(&mut self) -> Result<AttemptId, TransitionError> {
        if !self.state.is_settling() {
            return Err(TransitionError::InvalidTransition {
                from: self.state,
                event: "settle_elapsed",
            });
        }
        let attempt = self.lock.holder().ok_or(TransitionError::InvalidTransition {
            from: self.state,
            event: "settle_elapsed",
        })?;
        self.lock.release(attempt)?;
        self.state = ScanState::Idle;
        self.message = None;
        Ok(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_types::DenialKind;

    fn in_flight() -> (ScanMachine, AttemptId) {
        let mut machine = ScanMachine::new();
        let attempt = machine.begin_attempt().unwrap();
        (machine, attempt)
    }

    #[test]
    fn starts_idle_and_unlocked() {
        let machine = ScanMachine::new();
        assert_eq!(machine.state(), ScanState::Idle);
        assert!(!machine.is_locked());
        assert!(machine.can_start_attempt());
    }

    #[test]
    fn begin_attempt_takes_the_lock() {
        let (machine, attempt) = in_flight();
        assert_eq!(machine.state(), ScanState::Pending);
        assert_eq!(machine.current_attempt(), Some(attempt));
        assert!(!machine.can_start_attempt());
    }

    #[test]
    fn cannot_begin_while_an_attempt_is_outstanding() {
        let (mut machine, _) = in_flight();
        assert!(machine.begin_attempt().is_err());
        assert_eq!(machine.attempts_started(), 1);
    }

    #[test]
    fn grace_only_moves_pending_to_processing() {
        let (mut machine, _) = in_flight();
        machine.grace_elapsed().unwrap();
        assert_eq!(machine.state(), ScanState::Processing);
        assert!(machine.grace_elapsed().is_err());
        assert_eq!(machine.state(), ScanState::Processing);
    }

    #[test]
    fn granted_settles_without_message() {
        let (mut machine, attempt) = in_flight();
        let resolution = machine
            .apply_outcome(attempt, &VerificationOutcome::Granted)
            .unwrap();
        assert_eq!(resolution, Resolution::Settle);
        assert_eq!(machine.state(), ScanState::Granted);
        assert_eq!(machine.message(), None);
        assert!(machine.is_locked());
    }

    #[test]
    fn denial_settles_with_message() {
        let (mut machine, attempt) = in_flight();
        machine.grace_elapsed().unwrap();
        machine
            .apply_outcome(
                attempt,
                &VerificationOutcome::DeniedWithReason {
                    kind: DenialKind::ServerError,
                    reason: None,
                },
            )
            .unwrap();
        assert_eq!(machine.state(), ScanState::Denied);
        assert_eq!(machine.message(), Some("System Error"));
    }

    #[test]
    fn malformed_input_releases_immediately() {
        let (mut machine, attempt) = in_flight();
        let resolution = machine
            .apply_outcome(attempt, &VerificationOutcome::MalformedInput)
            .unwrap();
        assert_eq!(resolution, Resolution::Released);
        assert_eq!(machine.state(), ScanState::Idle);
        assert!(!machine.is_locked());
        assert_eq!(machine.message(), None);
    }

    #[test]
    fn settle_returns_to_idle_and_clears_message() {
        let (mut machine, attempt) = in_flight();
        machine
            .apply_outcome(attempt, &VerificationOutcome::transport("reset"))
            .unwrap();
        assert_eq!(machine.message(), Some("Connection error"));

        assert_eq!(machine.settle_elapsed(), Ok(attempt));
        assert_eq!(machine.state(), ScanState::Idle);
        assert_eq!(machine.message(), None);
        assert!(!machine.is_locked());
    }

    #[test]
    fn stale_attempt_is_refused_without_side_effects() {
        let (mut machine, attempt) = in_flight();
        let stale = AttemptId::new(attempt.as_u64() + 10);
        let err = machine
            .apply_outcome(stale, &VerificationOutcome::Granted)
            .unwrap_err();
        assert!(matches!(err, TransitionError::StaleAttempt { .. }));
        assert_eq!(machine.state(), ScanState::Pending);
    }

    #[test]
    fn second_outcome_for_same_attempt_is_refused() {
        let (mut machine, attempt) = in_flight();
        machine
            .apply_outcome(attempt, &VerificationOutcome::Granted)
            .unwrap();
        assert!(machine
            .apply_outcome(attempt, &VerificationOutcome::denied("late"))
            .is_err());
        assert_eq!(machine.state(), ScanState::Granted);
    }

    #[test]
    fn settle_outside_verdict_is_refused() {
        let mut machine = ScanMachine::new();
        assert!(machine.settle_elapsed().is_err());
        let attempt = machine.begin_attempt().unwrap();
        assert!(machine.settle_elapsed().is_err());
        assert_eq!(machine.current_attempt(), Some(attempt));
    }

    #[test]
    fn attempt_ids_increase() {
        let mut machine = ScanMachine::new();
        let first = machine.begin_attempt().unwrap();
        machine
            .apply_outcome(first, &VerificationOutcome::MalformedInput)
            .unwrap();
        let second = machine.begin_attempt().unwrap();
        assert!(second > first);
    }
}

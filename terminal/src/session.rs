//! Kiosk session: the scan-and-verify control loop.
//!
//! A [`KioskSession`] is created when the kiosk mounts and owns everything
//! the loop needs: the capture source, the [`ScanMachine`] (state, message
//! and attempt lock) and the [`TimerSet`]. It is a plain synchronous object:
//! every event takes the current [`Millis`] and returns what the driver must
//! do next, so the whole loop can be exercised with a fake clock.
//!
//! The driver contract is small:
//! 1. Sleep until [`next_deadline`](KioskSession::next_deadline), then call
//!    [`advance`](KioskSession::advance) and submit every returned image.
//! 2. When a submission resolves, hand the outcome to
//!    [`on_response`](KioskSession::on_response) with its attempt id.
//! 3. On unmount call [`teardown`](KioskSession::teardown). Responses that
//!    arrive afterwards are discarded.

use std::sync::Arc;

use kiosk_capture::CaptureSource;
use kiosk_types::{DenialKind, Millis, ScanState, ScanTimings, StillImage, VerificationOutcome};
use tracing::{debug, info, trace, warn};

use crate::display::DisplaySnapshot;
use crate::lock::AttemptId;
use crate::machine::{Resolution, ScanMachine};
use crate::metrics::{KioskMetrics, SKIP_CAPTURE_FAILED, SKIP_NOT_READY};
use crate::timers::{TimerHandle, TimerKind, TimerSet};
use crate::tracing_spans::attempt_span;
use crate::KioskError;

/// A captured still that must be sent to the verifier.
#[derive(Debug)]
pub struct Submission {
    pub attempt: AttemptId,
    pub image: StillImage,
}

/// Work the driver must perform after [`KioskSession::advance`].
#[derive(Debug)]
pub enum SessionEffect {
    Submit(Submission),
}

/// What happened to a verification response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseDisposition {
    Applied(Resolution),
    /// The attempt is no longer outstanding (or the session is gone).
    Discarded,
}

pub struct KioskSession<C> {
    capture: C,
    timings: ScanTimings,
    machine: ScanMachine,
    timers: TimerSet,
    /// Armings owned by the outstanding attempt.
    grace: Option<TimerHandle>,
    settle: Option<TimerHandle>,
    clock_ticks: u64,
    submitted_at: Option<Millis>,
    mounted: bool,
    metrics: Option<Arc<KioskMetrics>>,
}

impl<C: CaptureSource> KioskSession<C> {
    /// Mount a session at `now`: Idle, lock free, scan interval and clock armed.
    pub fn mount(capture: C, timings: ScanTimings, now: Millis) -> Result<Self, KioskError> {
        timings.validate()?;

        let mut timers = TimerSet::new();
        timers.arm_recurring(TimerKind::ClockTick, now, timings.clock_tick_ms);
        timers.arm_recurring(TimerKind::ScanInterval, now, timings.scan_interval_ms);

        debug!(source = capture.name(), ?timings, "kiosk session mounted");

        Ok(Self {
            capture,
            timings,
            machine: ScanMachine::new(),
            timers,
            grace: None,
            settle: None,
            clock_ticks: 0,
            submitted_at: None,
            mounted: true,
            metrics: None,
        })
    }

    /// Record loop activity in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<KioskMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> ScanState {
        self.machine.state()
    }

    pub fn message(&self) -> Option<&str> {
        self.machine.message()
    }

    pub fn is_locked(&self) -> bool {
        self.machine.is_locked()
    }

    pub fn current_attempt(&self) -> Option<AttemptId> {
        self.machine.current_attempt()
    }

    pub fn attempts_started(&self) -> u64 {
        self.machine.attempts_started()
    }

    pub fn clock_ticks(&self) -> u64 {
        self.clock_ticks
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn timings(&self) -> &ScanTimings {
        &self.timings
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// When the driver must next call [`advance`](Self::advance).
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    /// Fire every timer due at `now`, in deadline order.
    pub fn advance(&mut self, now: Millis) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        if !self.mounted {
            return effects;
        }

        while let Some(handle) = self.timers.pop_expired(now) {
            trace!(timer = %handle.kind(), at = %now, "timer expired");
            match handle.kind() {
                TimerKind::ScanInterval => {
                    if let Some(submission) = self.on_scan_tick(now) {
                        effects.push(SessionEffect::Submit(submission));
                    }
                }
                TimerKind::Grace => self.on_grace(handle),
                TimerKind::Settle => self.on_settle(handle, now),
                TimerKind::ClockTick => {
                    self.clock_ticks += 1;
                    if let Some(metrics) = &self.metrics {
                        metrics.clock_ticks.inc();
                    }
                }
            }
        }
        effects
    }

    fn on_scan_tick(&mut self, now: Millis) -> Option<Submission> {
        if let Some(metrics) = &self.metrics {
            metrics.scan_ticks.inc();
        }

        if !self.machine.can_start_attempt() {
            trace!(state = %self.machine.state(), "attempt outstanding, tick ignored");
            return None;
        }

        if !self.capture.ready() {
            trace!(source = self.capture.name(), "feed not ready, skipping");
            self.record_skip(SKIP_NOT_READY);
            return None;
        }

        let image = match self.capture.capture_still() {
            Ok(image) => image,
            Err(e) => {
                warn!(source = self.capture.name(), error = %e, "capture failed, skipping");
                self.record_skip(SKIP_CAPTURE_FAILED);
                return None;
            }
        };

        let attempt = match self.machine.begin_attempt() {
            Ok(attempt) => attempt,
            Err(e) => {
                warn!(error = %e, "capture accepted while an attempt is outstanding");
                return None;
            }
        };

        self.timers.cancel(TimerKind::ScanInterval);
        self.grace = Some(self.timers.arm_once(TimerKind::Grace, now, self.timings.grace_ms));
        self.submitted_at = Some(now);
        if let Some(metrics) = &self.metrics {
            metrics.attempts_started.inc();
        }

        let _span = attempt_span(attempt).entered();
        debug!(bytes = image.len(), at = %now, "capture accepted, submitting");

        Some(Submission { attempt, image })
    }

    fn on_grace(&mut self, handle: TimerHandle) {
        if self.grace.take() != Some(handle) {
            trace!(generation = handle.generation(), "grace timer not owned by an attempt");
            return;
        }
        match self.machine.grace_elapsed() {
            Ok(()) => debug!("no verdict within grace window, showing processing"),
            Err(e) => trace!(error = %e, "grace expired outside pending"),
        }
    }

    fn on_settle(&mut self, handle: TimerHandle, now: Millis) {
        if self.settle.take() != Some(handle) {
            trace!(generation = handle.generation(), "settle timer not owned by a verdict");
            return;
        }
        match self.machine.settle_elapsed() {
            Ok(attempt) => {
                let _span = attempt_span(attempt).entered();
                debug!("settled, returning to idle");
                self.enter_idle(now);
            }
            Err(e) => warn!(error = %e, "settle expired outside a verdict"),
        }
    }

    /// Apply the verifier's outcome for `attempt`.
    pub fn on_response(
        &mut self,
        attempt: AttemptId,
        outcome: VerificationOutcome,
        now: Millis,
    ) -> ResponseDisposition {
        let _span = attempt_span(attempt).entered();

        if !self.mounted {
            debug!(outcome = outcome.label(), "response after teardown, discarding");
            self.record_late();
            return ResponseDisposition::Discarded;
        }

        let resolution = match self.machine.apply_outcome(attempt, &outcome) {
            Ok(resolution) => resolution,
            Err(e) => {
                debug!(error = %e, outcome = outcome.label(), "discarding response");
                self.record_late();
                return ResponseDisposition::Discarded;
            }
        };

        if let Some(grace) = self.grace.take() {
            self.timers.cancel_handle(grace);
        }
        let latency_ms = self.submitted_at.take().map(|at| at.elapsed_since(now));
        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(outcome.label(), latency_ms);
        }
        log_outcome(&outcome, latency_ms);

        match resolution {
            Resolution::Settle => {
                let settle = self.timers.arm_once(TimerKind::Settle, now, self.timings.settle_ms);
                self.settle = Some(settle);
            }
            Resolution::Released => self.enter_idle(now),
        }
        ResponseDisposition::Applied(resolution)
    }

    fn enter_idle(&mut self, now: Millis) {
        self.timers.arm_recurring(TimerKind::ScanInterval, now, self.timings.scan_interval_ms);
    }

    /// Unmount: cancel every timer. Any outstanding request is abandoned.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.grace = None;
        self.settle = None;
        let cancelled = self.timers.cancel_all();
        debug!(
            cancelled,
            abandoned = ?self.machine.current_attempt(),
            "kiosk session torn down"
        );
    }

    /// What the screen should show right now.
    pub fn snapshot(&self) -> DisplaySnapshot {
        let phase = self.machine.state().display_phase();
        DisplaySnapshot {
            phase,
            message: self.machine.message().map(str::to_string),
            scan_overlay: phase.shows_scan_overlay(),
            clock_ticks: self.clock_ticks,
        }
    }

    fn record_skip(&self, reason: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_skip(reason);
        }
    }

    fn record_late(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.late_responses.inc();
        }
    }
}

fn log_outcome(outcome: &VerificationOutcome, latency_ms: Option<u64>) {
    match outcome {
        VerificationOutcome::Granted => info!(?latency_ms, "access granted"),
        VerificationOutcome::DeniedWithReason {
            kind: DenialKind::Policy,
            reason,
        } => info!(?latency_ms, reason = ?reason, "access denied by policy"),
        VerificationOutcome::DeniedWithReason {
            kind: DenialKind::ServerError,
            reason,
        } => warn!(?latency_ms, reason = ?reason, "verification service error"),
        VerificationOutcome::MalformedInput => {
            info!(?latency_ms, "capture rejected as malformed, back to idle")
        }
        VerificationOutcome::TransportFailure { detail } => {
            warn!(?latency_ms, %detail, "verification request failed")
        }
        VerificationOutcome::UnknownStatus { status } => {
            warn!(?latency_ms, status, "unexpected verification status")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_nullables::{NullCamera, NullClock};

    fn mounted(camera: NullCamera, clock: &NullClock) -> KioskSession<NullCamera> {
        KioskSession::mount(camera, ScanTimings::default(), clock.now()).unwrap()
    }

    fn submitted(effects: Vec<SessionEffect>) -> Vec<AttemptId> {
        effects
            .into_iter()
            .map(|SessionEffect::Submit(s)| s.attempt)
            .collect()
    }

    #[test]
    fn mount_arms_scan_and_clock_only() {
        let clock = NullClock::new(0);
        let session = mounted(NullCamera::ready(), &clock);
        assert_eq!(session.state(), ScanState::Idle);
        assert!(session.timers().is_armed(TimerKind::ScanInterval));
        assert!(session.timers().is_armed(TimerKind::ClockTick));
        assert!(!session.timers().is_armed(TimerKind::Grace));
        assert!(!session.timers().is_armed(TimerKind::Settle));
        assert_eq!(session.next_deadline(), Some(Millis::new(500)));
    }

    #[test]
    fn mount_rejects_zero_timings() {
        let timings = ScanTimings {
            settle_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            KioskSession::mount(NullCamera::ready(), timings, Millis::ZERO),
            Err(KioskError::Timings(_))
        ));
    }

    #[test]
    fn tick_submits_and_moves_to_pending() {
        let clock = NullClock::new(0);
        let mut session = mounted(NullCamera::ready(), &clock);

        let attempts = submitted(session.advance(clock.advance(500)));
        assert_eq!(attempts.len(), 1);
        assert_eq!(session.state(), ScanState::Pending);
        assert_eq!(session.current_attempt(), Some(attempts[0]));
        assert!(!session.timers().is_armed(TimerKind::ScanInterval));
        assert_eq!(session.timers().deadline(TimerKind::Grace), Some(Millis::new(900)));
    }

    #[test]
    fn capture_failure_is_a_skip() {
        let clock = NullClock::new(0);
        let camera = NullCamera::ready();
        camera.set_failing(true);
        let mut session = mounted(camera, &clock);

        assert!(session.advance(clock.advance(500)).is_empty());
        assert_eq!(session.state(), ScanState::Idle);
        assert!(!session.is_locked());
        assert_eq!(session.attempts_started(), 0);
        assert!(session.timers().is_armed(TimerKind::ScanInterval));
    }

    #[test]
    fn response_for_unknown_attempt_is_discarded() {
        let clock = NullClock::new(0);
        let mut session = mounted(NullCamera::ready(), &clock);
        session.advance(clock.advance(500));

        let disposition = session.on_response(
            AttemptId::new(99),
            VerificationOutcome::Granted,
            clock.advance(10),
        );
        assert_eq!(disposition, ResponseDisposition::Discarded);
        assert_eq!(session.state(), ScanState::Pending);
        assert!(session.timers().is_armed(TimerKind::Grace));
    }

    #[test]
    fn stale_response_leaves_the_next_attempts_grace_armed() {
        let clock = NullClock::new(0);
        let mut session = mounted(NullCamera::ready(), &clock);
        let first = submitted(session.advance(clock.advance(500)))[0];
        session.on_response(first, VerificationOutcome::MalformedInput, clock.advance(100));
        assert!(!session.timers().is_armed(TimerKind::Grace));

        let second = submitted(session.advance(clock.advance(500)))[0];
        assert!(second > first);
        assert_eq!(session.timers().deadline(TimerKind::Grace), Some(Millis::new(1_500)));

        let disposition =
            session.on_response(first, VerificationOutcome::Granted, clock.advance(100));
        assert_eq!(disposition, ResponseDisposition::Discarded);
        assert_eq!(session.timers().deadline(TimerKind::Grace), Some(Millis::new(1_500)));

        session.advance(clock.advance(300));
        assert_eq!(session.state(), ScanState::Processing);
    }

    #[test]
    fn teardown_cancels_everything_and_discards_late_response() {
        let clock = NullClock::new(0);
        let mut session = mounted(NullCamera::ready(), &clock);
        let attempt = submitted(session.advance(clock.advance(500)))[0];

        session.teardown();
        assert_eq!(session.timers().armed_count(), 0);
        assert_eq!(session.next_deadline(), None);

        let disposition =
            session.on_response(attempt, VerificationOutcome::Granted, clock.advance(100));
        assert_eq!(disposition, ResponseDisposition::Discarded);
        assert_eq!(session.state(), ScanState::Pending);
        assert_eq!(session.timers().armed_count(), 0);
        assert!(session.advance(clock.advance(10_000)).is_empty());
    }

    #[test]
    fn metrics_follow_the_loop() {
        let clock = NullClock::new(0);
        let camera = NullCamera::not_ready();
        let metrics = Arc::new(KioskMetrics::new().unwrap());
        let mut session = mounted(camera.clone(), &clock).with_metrics(Arc::clone(&metrics));

        session.advance(clock.advance(500));
        camera.set_ready(true);
        let attempt = submitted(session.advance(clock.advance(500)))[0];
        session.on_response(attempt, VerificationOutcome::Granted, clock.advance(120));

        assert_eq!(metrics.scan_ticks.get(), 2);
        assert_eq!(
            metrics
                .captures_skipped
                .with_label_values(&[SKIP_NOT_READY])
                .get(),
            1
        );
        assert_eq!(metrics.attempts_started.get(), 1);
        assert_eq!(metrics.outcomes.with_label_values(&["granted"]).get(), 1);
        assert_eq!(metrics.verification_latency_ms.get_sample_count(), 1);
        assert_eq!(metrics.clock_ticks.get(), 1);
    }
}

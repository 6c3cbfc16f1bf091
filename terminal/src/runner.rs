//! Drives a [`KioskSession`] on tokio.
//!
//! The runner owns the session and is the only code that mutates it, so
//! classification, transitions and timer expiries never interleave. It
//! selects over three sources:
//!
//! - the shutdown signal,
//! - completed verifications, delivered on an mpsc channel tagged with their
//!   attempt id,
//! - the session's next timer deadline.
//!
//! Verifications run on spawned tasks. On shutdown the runner tears the
//! session down and returns without waiting for them; when one finishes its
//! send fails and the outcome is dropped.

use std::sync::Arc;
use std::time::Duration;

use kiosk_capture::CaptureSource;
use kiosk_types::{Millis, ScanTimings, VerificationOutcome};
use kiosk_verification::Verifier;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, Instrument};

use crate::display::DisplaySnapshot;
use crate::lock::AttemptId;
use crate::metrics::KioskMetrics;
use crate::session::{KioskSession, SessionEffect, Submission};
use crate::tracing_spans::{session_span, verify_span};
use crate::KioskError;

type Completion = (AttemptId, VerificationOutcome);

pub struct KioskRunner<C, V> {
    session: KioskSession<C>,
    verifier: Arc<V>,
    display_tx: watch::Sender<DisplaySnapshot>,
    mounted_at: Instant,
}

impl<C, V> KioskRunner<C, V>
where
    C: CaptureSource,
    V: Verifier + 'static,
{
    /// Mount a session now and return the runner plus a display feed.
    pub fn new(
        capture: C,
        verifier: V,
        timings: ScanTimings,
        metrics: Option<Arc<KioskMetrics>>,
    ) -> Result<(Self, watch::Receiver<DisplaySnapshot>), KioskError> {
        let mut session = KioskSession::mount(capture, timings, Millis::ZERO)?;
        if let Some(metrics) = metrics {
            session = session.with_metrics(metrics);
        }
        let (display_tx, display_rx) = watch::channel(session.snapshot());

        Ok((
            Self {
                session,
                verifier: Arc::new(verifier),
                display_tx,
                mounted_at: Instant::now(),
            },
            display_rx,
        ))
    }

    pub fn session(&self) -> &KioskSession<C> {
        &self.session
    }

    /// Session time elapsed since mount.
    fn now(&self) -> Millis {
        let elapsed = self.mounted_at.elapsed().as_millis();
        Millis::new(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }

    fn instant_at(&self, at: Millis) -> Instant {
        self.mounted_at + Duration::from_millis(at.as_millis())
    }

    /// Run until `shutdown` fires, then tear the session down and return it.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> KioskSession<C> {
        let span = session_span(self.session.capture().name());
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

        async {
            debug!(verifier = self.verifier.name(), "kiosk runner started");
            loop {
                let deadline = self.session.next_deadline();
                let wake_at = self.instant_at(deadline.unwrap_or(Millis::ZERO));

                tokio::select! {
                    biased;

                    _ = shutdown.recv() => break,

                    Some((attempt, outcome)) = done_rx.recv() => {
                        let now = self.now();
                        self.session.on_response(attempt, outcome, now);
                    }

                    _ = sleep_until(wake_at), if deadline.is_some() => {
                        let now = self.now();
                        for effect in self.session.advance(now) {
                            match effect {
                                SessionEffect::Submit(submission) => {
                                    self.spawn_verification(submission, done_tx.clone());
                                }
                            }
                        }
                    }
                }

                self.publish();
            }

            self.session.teardown();
            self.publish();
        }
        .instrument(span)
        .await;

        self.session
    }

    fn spawn_verification(
        &self,
        submission: Submission,
        done_tx: mpsc::UnboundedSender<Completion>,
    ) {
        let Submission { attempt, image } = submission;
        let verifier = Arc::clone(&self.verifier);
        let span = verify_span(attempt, verifier.name());

        tokio::spawn(
            async move {
                let outcome = verifier.verify(image).await;
                if done_tx.send((attempt, outcome)).is_err() {
                    debug!("runner gone, dropping verification outcome");
                }
            }
            .instrument(span),
        );
    }

    fn publish(&self) {
        let snapshot = self.session.snapshot();
        self.display_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

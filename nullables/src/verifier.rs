//! Nullable verifier: scripted verdicts without a backend.

use kiosk_types::{StillImage, VerificationOutcome};
use kiosk_verification::Verifier;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A test verifier that replays scripted outcomes.
///
/// Each call pops the next scripted outcome, or repeats the fallback once the
/// script is exhausted. An optional delay (on tokio's clock, so it honours
/// paused time) simulates a slow round trip. The verifier also tracks how
/// many calls overlap, which lets tests assert the single-flight invariant.
#[derive(Clone)]
pub struct NullVerifier {
    inner: Arc<VerifierState>,
}

struct VerifierState {
    script: Mutex<VecDeque<VerificationOutcome>>,
    fallback: VerificationOutcome,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    images: Mutex<Vec<StillImage>>,
}

impl NullVerifier {
    /// Return the same outcome for every call.
    pub fn always(outcome: VerificationOutcome) -> Self {
        Self::scripted(Vec::new(), outcome)
    }

    /// Return `outcomes` in order, then `fallback` forever.
    pub fn scripted(outcomes: Vec<VerificationOutcome>, fallback: VerificationOutcome) -> Self {
        Self {
            inner: Arc::new(VerifierState {
                script: Mutex::new(outcomes.into()),
                fallback,
                delay: Mutex::new(Duration::ZERO),
                calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                images: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Delay every response by `delay`.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.lock().unwrap() = delay;
    }

    /// Append an outcome to the script.
    pub fn push(&self, outcome: VerificationOutcome) {
        self.inner.script.lock().unwrap().push_back(outcome);
    }

    /// Number of submissions received.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Number of submissions that produced a verdict.
    pub fn completed(&self) -> usize {
        self.inner.completed.load(Ordering::SeqCst)
    }

    /// Submissions currently awaiting a verdict.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping submissions observed.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    /// All images received, in submission order.
    pub fn images(&self) -> Vec<StillImage> {
        self.inner.images.lock().unwrap().clone()
    }
}

impl Verifier for NullVerifier {
    fn name(&self) -> &str {
        "null-verifier"
    }

    fn verify(&self, image: StillImage) -> impl Future<Output = VerificationOutcome> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            inner.calls.fetch_add(1, Ordering::SeqCst);
            inner.images.lock().unwrap().push(image);
            let now_in_flight = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            inner.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

            let delay = *inner.delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let outcome = inner
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| inner.fallback.clone());

            inner.in_flight.fetch_sub(1, Ordering::SeqCst);
            inner.completed.fetch_add(1, Ordering::SeqCst);
            outcome
        }
    }
}

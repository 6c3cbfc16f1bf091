//! Pluggable verification backend.
//!
//! The kiosk does not care HOW a face or badge is recognised, only WHAT the
//! verdict was. Any backend that can turn a still image into an outcome can
//! drive the scan loop.

use kiosk_types::{StillImage, VerificationOutcome};
use std::future::Future;

/// A backend that rules on one still image.
///
/// Implementations must resolve every failure into an outcome (usually
/// [`VerificationOutcome::TransportFailure`]) rather than erroring, and must
/// be safe to move onto a spawned task.
pub trait Verifier: Send + Sync {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;

    /// Submit one image and wait for the classified verdict.
    fn verify(&self, image: StillImage) -> impl Future<Output = VerificationOutcome> + Send;
}

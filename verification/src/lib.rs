//! Verification client for the entry kiosk.
//!
//! One still image goes out, one [`VerificationOutcome`] comes back. The
//! client never fails: every transport problem and every status code is
//! folded into an outcome by [`classify_response`], so the scan loop only has
//! to map outcomes onto state transitions.
//!
//! The verifier is pluggable behind [`Verifier`]; the kiosk ships with
//! [`HttpVerifier`], tests use the null verifier from `kiosk-nullables`.

pub mod classify;
pub mod client;
pub mod error;
pub mod method;

pub use classify::{backend_reason, classify_response, reads_body};
pub use client::HttpVerifier;
pub use error::VerificationError;
pub use method::Verifier;

pub use kiosk_types::VerificationOutcome;

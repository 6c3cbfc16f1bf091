//! Pre-built [`tracing::Span`] constructors for the scan loop.
//!
//! Consistent span names and fields make it easy to follow one attempt from
//! capture to settle in aggregated kiosk logs.

use tracing::{debug_span, info_span, Span};

use crate::lock::AttemptId;

/// Span covering one capture-submit-classify cycle.
pub fn attempt_span(attempt: AttemptId) -> Span {
    info_span!("attempt", id = attempt.as_u64())
}

/// Span covering the network round trip of one attempt.
pub fn verify_span(attempt: AttemptId, verifier: &str) -> Span {
    debug_span!("verify", id = attempt.as_u64(), verifier = %verifier)
}

/// Span covering a whole kiosk session, from mount to teardown.
pub fn session_span(source: &str) -> Span {
    info_span!("kiosk_session", source = %source)
}

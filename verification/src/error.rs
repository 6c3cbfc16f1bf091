use thiserror::Error;

/// Errors raised while setting up a verifier.
///
/// Round trips themselves never error; they resolve to a
/// [`VerificationOutcome`](kiosk_types::VerificationOutcome).
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid verification endpoint `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

//! Classified verdicts returned by the verification service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown for a policy denial that carries no reason.
pub const NO_ACCESS_MESSAGE: &str = "No access";
/// Shown for a server error that carries no reason.
pub const SYSTEM_ERROR_MESSAGE: &str = "System Error";
/// Shown when the request never produced a response.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error";
/// Shown for any status outside the contract.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Why the backend denied entry.
///
/// Both kinds render as a denial; they are kept apart so logs and metrics
/// can tell a refused badge from a broken backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenialKind {
    /// The backend refused entry (HTTP 403).
    Policy,
    /// The backend failed while deciding (HTTP 500).
    ServerError,
}

impl DenialKind {
    /// Message used when the backend supplied no reason.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Policy => NO_ACCESS_MESSAGE,
            Self::ServerError => SYSTEM_ERROR_MESSAGE,
        }
    }
}

/// The outcome of one verification round trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationOutcome {
    /// Entry granted.
    Granted,
    /// Entry denied, optionally with a backend-supplied reason.
    DeniedWithReason {
        kind: DenialKind,
        reason: Option<String>,
    },
    /// The backend could not use the image (no code found, unreadable frame).
    MalformedInput,
    /// No response was received. `detail` is for logs only.
    TransportFailure { detail: String },
    /// A status outside the contract.
    UnknownStatus { status: u16 },
}

impl VerificationOutcome {
    /// Shorthand for a policy denial.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::DeniedWithReason {
            kind: DenialKind::Policy,
            reason: Some(reason.into()),
        }
    }

    /// Shorthand for a transport failure.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::TransportFailure {
            detail: detail.into(),
        }
    }

    /// Whether this outcome dwells in a verdict state and arms the settle timer.
    pub fn settles(&self) -> bool {
        !matches!(self, Self::MalformedInput)
    }

    /// Whether this outcome grants entry.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// The message shown on the status panel, if any.
    pub fn display_message(&self) -> Option<String> {
        match self {
            Self::Granted | Self::MalformedInput => None,
            Self::DeniedWithReason { kind, reason } => Some(
                reason
                    .as_deref()
                    .filter(|r| !r.is_empty())
                    .unwrap_or(kind.default_message())
                    .to_string(),
            ),
            Self::TransportFailure { .. } => Some(CONNECTION_ERROR_MESSAGE.to_string()),
            Self::UnknownStatus { .. } => Some(UNKNOWN_ERROR_MESSAGE.to_string()),
        }
    }

    /// Stable label for metrics and structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::DeniedWithReason {
                kind: DenialKind::Policy,
                ..
            } => "denied_policy",
            Self::DeniedWithReason {
                kind: DenialKind::ServerError,
                ..
            } => "denied_server_error",
            Self::MalformedInput => "malformed_input",
            Self::TransportFailure { .. } => "transport_failure",
            Self::UnknownStatus { .. } => "unknown_status",
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportFailure { detail } => write!(f, "transport_failure ({detail})"),
            Self::UnknownStatus { status } => write!(f, "unknown_status ({status})"),
            other => f.write_str(other.label()),
        }
    }
}

//! Response classification.
//!
//! | Status | Outcome | Body |
//! |---|---|---|
//! | 200 | `Granted` | must be JSON |
//! | 400 | `MalformedInput` | ignored |
//! | 403 | `DeniedWithReason { Policy }` | JSON, `{"message"?: string}` |
//! | 500 | `DeniedWithReason { ServerError }` | JSON, `{"message"?: string}` |
//! | other | `UnknownStatus` | ignored |
//!
//! A 200/403/500 body that is not JSON is a `TransportFailure`: whatever answered
//! is not the verification service. Transport errors proper never reach this
//! module; the client maps them directly.

use kiosk_types::{DenialKind, VerificationOutcome};
use serde_json::Value;

pub const STATUS_GRANTED: u16 = 200;
pub const STATUS_MALFORMED_INPUT: u16 = 400;
pub const STATUS_POLICY_DENIED: u16 = 403;
pub const STATUS_SERVER_ERROR: u16 = 500;

/// Whether the body of a response with this status has to be read.
pub fn reads_body(status: u16) -> bool {
    matches!(
        status,
        STATUS_GRANTED | STATUS_POLICY_DENIED | STATUS_SERVER_ERROR
    )
}

/// Classify a completed HTTP exchange.
pub fn classify_response(status: u16, body: &[u8]) -> VerificationOutcome {
    let kind = match status {
        STATUS_MALFORMED_INPUT => return VerificationOutcome::MalformedInput,
        STATUS_GRANTED => None,
        STATUS_POLICY_DENIED => Some(DenialKind::Policy),
        STATUS_SERVER_ERROR => Some(DenialKind::ServerError),
        status => return VerificationOutcome::UnknownStatus { status },
    };

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            return VerificationOutcome::transport(format!("{status} response is not JSON: {e}"))
        }
    };

    match kind {
        None => VerificationOutcome::Granted,
        Some(kind) => VerificationOutcome::DeniedWithReason {
            kind,
            reason: backend_reason(&value),
        },
    }
}

/// Extract a non-empty string `message` from a JSON object.
///
/// Missing, empty or non-string messages and non-object bodies yield `None`
/// so the caller falls back to the default text.
pub fn backend_reason(value: &Value) -> Option<String> {
    value
        .get("message")?
        .as_str()
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_with_json_body_is_granted() {
        assert_eq!(classify_response(200, b"{}"), VerificationOutcome::Granted);
        assert_eq!(
            classify_response(200, br#"{"code":0,"text":"Verification successful."}"#),
            VerificationOutcome::Granted
        );
    }

    #[test]
    fn ok_without_json_body_is_a_connection_error() {
        let bodies: [&[u8]; 3] = [b"<html>ok</html>", b"", b"not json"];
        for body in bodies {
            let outcome = classify_response(200, body);
            assert!(!outcome.is_granted(), "granted on {body:?}");
            assert!(matches!(outcome, VerificationOutcome::TransportFailure { .. }));
            assert_eq!(outcome.display_message().as_deref(), Some("Connection error"));
        }
    }

    #[test]
    fn bad_request_is_malformed_input() {
        assert_eq!(
            classify_response(400, br#"{"error":"no code found"}"#),
            VerificationOutcome::MalformedInput
        );
        assert_eq!(classify_response(400, b""), VerificationOutcome::MalformedInput);
    }

    #[test]
    fn forbidden_carries_backend_reason() {
        let outcome = classify_response(403, br#"{"message":"Badge expired"}"#);
        assert_eq!(outcome, VerificationOutcome::denied("Badge expired"));
        assert_eq!(outcome.display_message().as_deref(), Some("Badge expired"));
    }

    #[test]
    fn forbidden_without_message_says_no_access() {
        let outcome = classify_response(403, b"{}");
        assert_eq!(outcome.display_message().as_deref(), Some("No access"));
    }

    #[test]
    fn server_error_with_empty_object_says_system_error() {
        let outcome = classify_response(500, b"{}");
        assert_eq!(
            outcome,
            VerificationOutcome::DeniedWithReason {
                kind: DenialKind::ServerError,
                reason: None,
            }
        );
        assert_eq!(outcome.display_message().as_deref(), Some("System Error"));
    }

    #[test]
    fn denial_with_html_body_is_a_connection_error() {
        for status in [403, 500] {
            let outcome = classify_response(status, b"<html>Internal Server Error</html>");
            assert!(matches!(outcome, VerificationOutcome::TransportFailure { .. }));
            assert_eq!(outcome.display_message().as_deref(), Some("Connection error"));
        }
    }

    #[test]
    fn unexpected_statuses_are_unknown() {
        for status in [201, 204, 301, 401, 404, 418, 502, 503] {
            let outcome = classify_response(status, b"<html></html>");
            assert_eq!(outcome, VerificationOutcome::UnknownStatus { status });
            assert_eq!(outcome.display_message().as_deref(), Some("Unknown error"));
        }
    }

    #[test]
    fn reason_ignores_non_string_and_empty_messages() {
        assert_eq!(backend_reason(&json!({"message": 42})), None);
        assert_eq!(backend_reason(&json!({"message": ""})), None);
        assert_eq!(backend_reason(&json!(["message"])), None);
        assert_eq!(backend_reason(&Value::Null), None);
        assert_eq!(
            backend_reason(&json!({"message": "Face mismatch", "code": 7})).as_deref(),
            Some("Face mismatch")
        );
    }

    #[test]
    fn grants_and_denials_read_the_body() {
        assert!(reads_body(200));
        assert!(reads_body(403));
        assert!(reads_body(500));
        assert!(!reads_body(400));
        assert!(!reads_body(418));
    }
}

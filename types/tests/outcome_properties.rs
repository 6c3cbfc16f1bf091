use proptest::prelude::*;

use kiosk_types::{DenialKind, ScanState, VerificationOutcome};

fn any_outcome() -> impl Strategy<Value = VerificationOutcome> {
    prop_oneof![
        Just(VerificationOutcome::Granted),
        Just(VerificationOutcome::MalformedInput),
        (any::<bool>(), proptest::option::of(".{0,24}")).prop_map(|(policy, reason)| {
            VerificationOutcome::DeniedWithReason {
                kind: if policy {
                    DenialKind::Policy
                } else {
                    DenialKind::ServerError
                },
                reason,
            }
        }),
        ".{0,24}".prop_map(|detail| VerificationOutcome::TransportFailure { detail }),
        any::<u16>().prop_map(|status| VerificationOutcome::UnknownStatus { status }),
    ]
}

proptest! {
    /// Every outcome that dwells on a verdict shows a message, except a grant.
    #[test]
    fn settling_denials_always_carry_text(outcome in any_outcome()) {
        let message = outcome.display_message();
        if outcome.settles() && !outcome.is_granted() {
            prop_assert!(message.map(|m| !m.is_empty()).unwrap_or(false));
        } else {
            prop_assert!(message.is_none());
        }
    }

    /// Transport details never leak onto the panel.
    #[test]
    fn transport_detail_is_never_displayed(detail in "[a-z]{1,16}") {
        let outcome = VerificationOutcome::TransportFailure { detail };
        let message = outcome.display_message();
        prop_assert_eq!(message.as_deref(), Some("Connection error"));
    }
}

#[test]
fn only_idle_and_pending_show_the_overlay() {
    let shown: Vec<ScanState> = [
        ScanState::Idle,
        ScanState::Pending,
        ScanState::Processing,
        ScanState::Granted,
        ScanState::Denied,
    ]
    .into_iter()
    .filter(|s| s.display_phase().shows_scan_overlay())
    .collect();
    assert_eq!(shown, vec![ScanState::Idle, ScanState::Pending]);
}

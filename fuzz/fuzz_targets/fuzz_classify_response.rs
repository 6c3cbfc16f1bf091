#![no_main]

use kiosk_verification::classify_response;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u16, &[u8])| {
    let (status, body) = input;
    let outcome = classify_response(status, body);

    // Every response maps to a displayable outcome; only a 200 with a JSON body grants.
    if outcome.is_granted() {
        assert_eq!(status, 200);
        assert!(serde_json::from_slice::<serde_json::Value>(body).is_ok());
    }
    match outcome.display_message() {
        Some(message) => assert!(!message.is_empty()),
        None => assert!(matches!(status, 200 | 400)),
    }
});

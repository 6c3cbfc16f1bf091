#![no_main]

use arbitrary::Arbitrary;
use kiosk_nullables::{NullCamera, NullClock};
use kiosk_terminal::{AttemptId, KioskSession, SessionEffect};
use kiosk_types::{Millis, ScanState, ScanTimings};
use kiosk_verification::classify_response;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Step {
    Wait(u16),
    Respond { status: u16, body: Vec<u8> },
    Stale(u8),
    Ready(bool),
}

fuzz_target!(|steps: Vec<Step>| {
    let clock = NullClock::new(0);
    let camera = NullCamera::ready();
    let mut session = match KioskSession::mount(camera.clone(), ScanTimings::default(), clock.now())
    {
        Ok(session) => session,
        Err(_) => return,
    };
    let mut outstanding: Option<AttemptId> = None;

    for step in steps {
        match step {
            Step::Wait(ms) => {
                let until = clock.now() + u64::from(ms);
                while let Some(deadline) = session.next_deadline() {
                    if deadline > until {
                        break;
                    }
                    clock.set(deadline.as_millis());
                    for SessionEffect::Submit(submission) in session.advance(deadline) {
                        assert!(outstanding.is_none(), "overlapping submissions");
                        outstanding = Some(submission.attempt);
                    }
                }
                clock.set(until.as_millis());
            }
            Step::Respond { status, body } => {
                if let Some(attempt) = outstanding.take() {
                    session.on_response(attempt, classify_response(status, &body), clock.now());
                }
            }
            Step::Stale(offset) => {
                let stale = AttemptId::new(session.attempts_started() + 1 + u64::from(offset));
                let before = session.state();
                session.on_response(stale, classify_response(200, b"{}"), Millis::new(0));
                assert_eq!(session.state(), before);
            }
            Step::Ready(ready) => camera.set_ready(ready),
        }
        assert_eq!(session.is_locked(), session.state() != ScanState::Idle);
    }
});

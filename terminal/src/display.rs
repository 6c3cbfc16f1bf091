//! What the kiosk screen should show.
//!
//! The live feed and the clock face are drawn elsewhere; this is the part
//! driven by the scan loop: the displayed phase, the scan-target overlay,
//! the status panel text and the clock tick count.

use kiosk_types::DisplayPhase;
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DisplaySnapshot {
    pub phase: DisplayPhase,
    /// Denial text, present only while `phase` is Denied.
    pub message: Option<String>,
    pub scan_overlay: bool,
    /// Clock ticks since mount. The clock face re-renders whenever this moves.
    pub clock_ticks: u64,
}

impl DisplaySnapshot {
    /// Status panel lines, top to bottom.
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .phase
            .headline()
            .iter()
            .map(|line| line.to_string())
            .collect();
        if self.phase == DisplayPhase::Denied {
            if let Some(message) = &self.message {
                lines.push(message.clone());
            }
        }
        lines
    }

    /// Whether the scan-driven part of the screen differs, ignoring the clock.
    pub fn panel_differs(&self, other: &Self) -> bool {
        self.phase != other.phase
            || self.message != other.message
            || self.scan_overlay != other.scan_overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_panel_prompts_for_a_code() {
        let snapshot = DisplaySnapshot {
            scan_overlay: true,
            ..Default::default()
        };
        assert_eq!(
            snapshot.status_lines(),
            vec!["Hello, please", "verify Your QR", "code above"]
        );
    }

    #[test]
    fn denied_panel_appends_message() {
        let snapshot = DisplaySnapshot {
            phase: DisplayPhase::Denied,
            message: Some("Badge expired".into()),
            scan_overlay: false,
            clock_ticks: 0,
        };
        assert_eq!(
            snapshot.status_lines(),
            vec!["Access", "Denied", "Badge expired"]
        );
    }

    #[test]
    fn clock_ticks_alone_do_not_change_the_panel() {
        let a = DisplaySnapshot::default();
        let b = DisplaySnapshot {
            clock_ticks: 5,
            ..Default::default()
        };
        assert!(!a.panel_differs(&b));
        assert_ne!(a, b);
    }
}

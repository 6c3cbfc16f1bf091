//! Timer arena: one slot per timer kind.
//!
//! Every timer the kiosk uses lives in a fixed slot of a [`TimerSet`], so
//! teardown can cancel all of them in one call and no timer can be leaked in
//! a loosely-scoped variable. Timers are pure deadlines on the session's
//! [`Millis`] timeline; the driver decides how to sleep until the next one.
//!
//! Arming a slot that is already armed replaces the old timer. Each arming
//! gets a fresh generation, so a [`TimerHandle`] from an earlier arming can
//! never cancel (or be mistaken for) the timer that replaced it.

use kiosk_types::Millis;
use std::fmt;

/// The timers of a kiosk session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Recurring capture cadence, armed only while idle.
    ScanInterval,
    /// One-shot delay before an outstanding attempt is shown as processing.
    Grace,
    /// One-shot dwell on a verdict before returning to idle.
    Settle,
    /// Recurring display clock tick, independent of scanning.
    ClockTick,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::ScanInterval,
        TimerKind::Grace,
        TimerKind::Settle,
        TimerKind::ClockTick,
    ];

    fn slot(self) -> usize {
        match self {
            Self::ScanInterval => 0,
            Self::Grace => 1,
            Self::Settle => 2,
            Self::ClockTick => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScanInterval => "scan_interval",
            Self::Grace => "grace",
            Self::Settle => "settle",
            Self::ClockTick => "clock_tick",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one arming of one timer slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    kind: TimerKind,
    generation: u64,
}

impl TimerHandle {
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Copy, Debug)]
struct Armed {
    generation: u64,
    deadline: Millis,
    /// `Some(period)` for recurring timers.
    period: Option<u64>,
}

/// Fixed arena of cancellable timers.
#[derive(Debug, Default)]
pub struct TimerSet {
    slots: [Option<Armed>; 4],
    next_generation: u64,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer firing `delay_ms` after `now`.
    pub fn arm_once(&mut self, kind: TimerKind, now: Millis, delay_ms: u64) -> TimerHandle {
        self.arm(kind, now + delay_ms, None)
    }

    /// Arm a recurring timer whose first expiry is one `period_ms` after `now`.
    pub fn arm_recurring(&mut self, kind: TimerKind, now: Millis, period_ms: u64) -> TimerHandle {
        self.arm(kind, now + period_ms, Some(period_ms.max(1)))
    }

    fn arm(&mut self, kind: TimerKind, deadline: Millis, period: Option<u64>) -> TimerHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.slots[kind.slot()] = Some(Armed {
            generation,
            deadline,
            period,
        });
        TimerHandle { kind, generation }
    }

    /// Cancel whatever is armed in `kind`'s slot. Returns whether a timer was armed.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].take().is_some()
    }

    /// Cancel the timer only if `handle` still refers to the current arming.
    pub fn cancel_handle(&mut self, handle: TimerHandle) -> bool {
        if self.is_current(handle) {
            self.slots[handle.kind.slot()] = None;
            true
        } else {
            false
        }
    }

    /// Cancel every timer. Returns how many were armed.
    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for slot in self.slots.iter_mut() {
            if slot.take().is_some() {
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Whether `handle` refers to the arming currently in its slot.
    fn is_current(&self, handle: TimerHandle) -> bool {
        self.slots[handle.kind.slot()].is_some_and(|armed| armed.generation == handle.generation)
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Millis> {
        self.slots[kind.slot()].map(|armed| armed.deadline)
    }

    pub fn armed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Earliest deadline across all armed timers.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.slots.iter().flatten().map(|armed| armed.deadline).min()
    }

    /// Pop the earliest timer due at `now`, if any.
    ///
    /// Ties are broken by arming order. One-shot timers are disarmed;
    /// recurring timers are re-armed at their next period boundary after
    /// `now`, so a late driver sees one expiry rather than a burst of
    /// backlogged ones.
    pub fn pop_expired(&mut self, now: Millis) -> Option<TimerHandle> {
        let kind = TimerKind::ALL
            .into_iter()
            .filter_map(|kind| self.slots[kind.slot()].map(|armed| (kind, armed)))
            .filter(|(_, armed)| armed.deadline <= now)
            .min_by_key(|(_, armed)| (armed.deadline, armed.generation))
            .map(|(kind, _)| kind)?;

        let slot = &mut self.slots[kind.slot()];
        let armed = (*slot)?;
        let handle = TimerHandle {
            kind,
            generation: armed.generation,
        };

        match armed.period {
            Some(period) => {
                let behind = armed.deadline.elapsed_since(now);
                let skipped = behind / period;
                let next = armed.deadline + period * (skipped + 1);
                *slot = Some(Armed {
                    deadline: next,
                    ..armed
                });
            }
            None => *slot = None,
        }

        Some(handle)
    }
}

//! Entry kiosk scan loop.
//!
//! The terminal is the part of the kiosk that:
//! - Samples the live feed at a fixed cadence while idle
//! - Keeps at most one verification request in flight
//! - Maps the verifier's verdict onto the scan state machine
//! - Returns to idle on its own after every verdict
//! - Ticks the display clock independently of scanning
//!
//! [`KioskSession`] is the synchronous core and takes the current time on
//! every event. [`KioskRunner`] drives it on tokio.

pub mod config;
pub mod display;
pub mod error;
pub mod lock;
pub mod machine;
pub mod metrics;
pub mod runner;
pub mod session;
pub mod shutdown;
pub mod timers;
pub mod tracing_spans;

pub use config::KioskConfig;
pub use display::DisplaySnapshot;
pub use error::{KioskError, TransitionError};
pub use lock::{AttemptId, AttemptLock};
pub use machine::{Resolution, ScanMachine};
pub use metrics::KioskMetrics;
pub use runner::KioskRunner;
pub use session::{KioskSession, ResponseDisposition, SessionEffect, Submission};
pub use shutdown::{ShutdownController, ShutdownReason};
pub use timers::{TimerHandle, TimerKind, TimerSet};

//! Fundamental types for the entry kiosk.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! scan states, verification outcomes, still images, monotonic time and loop timings.

pub mod error;
pub mod image;
pub mod outcome;
pub mod params;
pub mod state;
pub mod time;

pub use error::KioskTypesError;
pub use image::StillImage;
pub use outcome::{DenialKind, VerificationOutcome};
pub use params::ScanTimings;
pub use state::{DisplayPhase, ScanState};
pub use time::Millis;

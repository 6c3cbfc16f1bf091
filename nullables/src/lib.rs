//! Nullable infrastructure for deterministic testing.
//!
//! Everything the scan loop touches outside its own state (time, the camera,
//! the verification backend) is abstracted behind a trait or an explicit
//! `now` argument. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, even after being moved into a session
//! - Never touch a device or the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod camera;
pub mod clock;
pub mod verifier;

pub use camera::NullCamera;
pub use clock::NullClock;
pub use verifier::NullVerifier;

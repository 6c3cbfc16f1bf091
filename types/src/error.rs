//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for kiosk value types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KioskTypesError {
    #[error("timing `{name}` must be greater than zero")]
    ZeroTiming { name: &'static str },

    #[error("still image is empty")]
    EmptyImage,
}

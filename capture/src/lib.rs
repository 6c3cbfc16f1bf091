//! Capture sources for the kiosk's live feed.
//!
//! The scan loop only needs two things from a camera: whether a usable frame
//! is available right now, and a still copy of it. Sources are plugged in
//! behind [`CaptureSource`]; the scan loop never touches the device itself.

pub mod error;
pub mod snapshot;

pub use error::CaptureError;
pub use snapshot::SnapshotFileSource;

use kiosk_types::StillImage;

/// A live feed that can be sampled for still images.
pub trait CaptureSource {
    /// Whether the feed currently has a frame worth capturing.
    fn ready(&self) -> bool;

    /// Capture one still JPEG from the feed.
    fn capture_still(&mut self) -> Result<StillImage, CaptureError>;

    /// Human-readable name of this source.
    fn name(&self) -> &str;
}

impl<T: CaptureSource + ?Sized> CaptureSource for Box<T> {
    fn ready(&self) -> bool {
        (**self).ready()
    }

    fn capture_still(&mut self) -> Result<StillImage, CaptureError> {
        (**self).capture_still()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

//! Nullable camera: a capture source that never touches a device.

use kiosk_capture::{CaptureError, CaptureSource};
use kiosk_types::StillImage;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A scriptable capture source.
///
/// Clones share state, so a test can keep one handle and flip readiness
/// after the other has been moved into a session.
#[derive(Clone)]
pub struct NullCamera {
    inner: Arc<CameraState>,
}

struct CameraState {
    ready: AtomicBool,
    failing: AtomicBool,
    captures: AtomicUsize,
}

impl NullCamera {
    /// A camera whose feed is live.
    pub fn ready() -> Self {
        Self::with_readiness(true)
    }

    /// A camera whose feed has not started yet.
    pub fn not_ready() -> Self {
        Self::with_readiness(false)
    }

    fn with_readiness(ready: bool) -> Self {
        Self {
            inner: Arc::new(CameraState {
                ready: AtomicBool::new(ready),
                failing: AtomicBool::new(false),
                captures: AtomicUsize::new(0),
            }),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.inner.ready.store(ready, Ordering::SeqCst);
    }

    /// Make every capture fail even though the feed reports ready.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stills successfully captured.
    pub fn captures(&self) -> usize {
        self.inner.captures.load(Ordering::SeqCst)
    }
}

impl CaptureSource for NullCamera {
    fn ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }

    fn capture_still(&mut self) -> Result<StillImage, CaptureError> {
        if !self.ready() {
            return Err(CaptureError::NotReady);
        }
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(CaptureError::Other("simulated capture failure".into()));
        }
        let n = self.inner.captures.fetch_add(1, Ordering::SeqCst) as u32;
        // JPEG SOI marker followed by the capture index, so stills are distinguishable.
        let mut frame = vec![0xFF, 0xD8];
        frame.extend_from_slice(&n.to_be_bytes());
        StillImage::new(frame).map_err(|e| CaptureError::Other(e.to_string()))
    }

    fn name(&self) -> &str {
        "null-camera"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_readiness() {
        let camera = NullCamera::not_ready();
        let handle = camera.clone();
        handle.set_ready(true);
        assert!(camera.ready());
    }

    #[test]
    fn captures_are_numbered_jpegs() {
        let mut camera = NullCamera::ready();
        let first = camera.capture_still().unwrap();
        let second = camera.capture_still().unwrap();
        assert!(first.is_jpeg());
        assert_ne!(first, second);
        assert_eq!(camera.captures(), 2);
    }

    #[test]
    fn not_ready_camera_refuses_to_capture() {
        let mut camera = NullCamera::not_ready();
        assert!(matches!(camera.capture_still(), Err(CaptureError::NotReady)));
        assert_eq!(camera.captures(), 0);
    }

    #[test]
    fn failing_camera_reports_error() {
        let mut camera = NullCamera::ready();
        camera.set_failing(true);
        assert!(camera.capture_still().is_err());
        assert_eq!(camera.captures(), 0);
    }
}

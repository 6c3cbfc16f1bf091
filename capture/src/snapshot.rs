//! Frame-file capture source.
//!
//! Camera daemons such as `ffmpeg -update 1` or `libcamera-still --timelapse`
//! keep overwriting a single JPEG with the latest frame. This source samples
//! that file. The feed counts as ready only while the file exists, is
//! non-empty, and was written recently enough to still be "live".

use crate::{CaptureError, CaptureSource};
use kiosk_types::StillImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Samples the latest frame written by an external grabber.
pub struct SnapshotFileSource {
    path: PathBuf,
    /// Frames older than this are treated as a stalled feed.
    max_frame_age: Duration,
    label: String,
}

impl SnapshotFileSource {
    pub fn new(path: impl Into<PathBuf>, max_frame_age: Duration) -> Self {
        let path = path.into();
        let label = format!("snapshot:{}", path.display());
        Self {
            path,
            max_frame_age,
            label,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn frame_is_fresh(&self, modified: SystemTime) -> bool {
        match SystemTime::now().duration_since(modified) {
            Ok(age) => age <= self.max_frame_age,
            // Modified in the future (clock skew between grabber and kiosk): accept.
            Err(_) => true,
        }
    }
}

impl CaptureSource for SnapshotFileSource {
    fn ready(&self) -> bool {
        let Ok(meta) = fs::metadata(&self.path) else {
            return false;
        };
        if !meta.is_file() || meta.len() == 0 {
            return false;
        }
        match meta.modified() {
            Ok(modified) => self.frame_is_fresh(modified),
            // Platforms without mtime cannot detect a stall.
            Err(_) => true,
        }
    }

    fn capture_still(&mut self) -> Result<StillImage, CaptureError> {
        let bytes = fs::read(&self.path).map_err(|source| CaptureError::Read {
            path: self.path.display().to_string(),
            source,
        })?;
        let image = StillImage::new(bytes).map_err(|_| CaptureError::Empty)?;
        if !image.is_jpeg() {
            return Err(CaptureError::NotJpeg { len: image.len() });
        }
        tracing::trace!(bytes = image.len(), source = %self.label, "captured still");
        Ok(image)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn write_frame(dir: &tempfile::TempDir, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join("frame.jpg");
        let mut file = fs::File::create(&path).expect("create frame");
        file.write_all(bytes).expect("write frame");
        path
    }

    #[test]
    fn missing_file_is_not_ready() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = SnapshotFileSource::new(dir.path().join("absent.jpg"), Duration::from_secs(2));
        assert!(!source.ready());
    }

    #[test]
    fn empty_file_is_not_ready() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_frame(&dir, &[]);
        let source = SnapshotFileSource::new(path, Duration::from_secs(2));
        assert!(!source.ready());
    }

    #[test]
    fn fresh_jpeg_is_ready_and_captured() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_frame(&dir, &JPEG_HEADER);
        let mut source = SnapshotFileSource::new(path, Duration::from_secs(60));
        assert!(source.ready());
        let image = source.capture_still().expect("capture");
        assert_eq!(image.as_bytes(), &JPEG_HEADER);
    }

    #[test]
    fn stale_frame_is_not_ready() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_frame(&dir, &JPEG_HEADER);
        let old = SystemTime::now() - Duration::from_secs(120);
        fs::File::options()
            .write(true)
            .open(&path)
            .and_then(|f| f.set_modified(old))
            .expect("backdate frame");
        let source = SnapshotFileSource::new(path, Duration::from_secs(2));
        assert!(!source.ready());
    }

    #[test]
    fn non_jpeg_frame_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_frame(&dir, b"\x89PNG\r\n");
        let mut source = SnapshotFileSource::new(path, Duration::from_secs(60));
        assert!(matches!(
            source.capture_still(),
            Err(CaptureError::NotJpeg { len: 6 })
        ));
    }

    #[test]
    fn name_includes_path() {
        let source = SnapshotFileSource::new("/run/kiosk/frame.jpg", Duration::from_secs(1));
        assert_eq!(source.name(), "snapshot:/run/kiosk/frame.jpg");
    }
}

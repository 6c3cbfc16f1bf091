//! Still images captured from the live feed.

use crate::KioskTypesError;
use std::fmt;

/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// One encoded still frame, submitted as the whole verification payload.
#[derive(Clone, PartialEq, Eq)]
pub struct StillImage(Vec<u8>);

impl StillImage {
    /// Wrap encoded bytes. Empty buffers are rejected.
    pub fn new(bytes: Vec<u8>) -> Result<Self, KioskTypesError> {
        if bytes.is_empty() {
            return Err(KioskTypesError::EmptyImage);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the buffer starts with a JPEG start-of-image marker.
    pub fn is_jpeg(&self) -> bool {
        self.0.starts_with(&JPEG_SOI)
    }
}

impl fmt::Debug for StillImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StillImage({} bytes)", self.0.len())
    }
}

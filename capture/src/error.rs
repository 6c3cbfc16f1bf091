use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("feed is not ready")]
    NotReady,

    #[error("failed to read frame {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("frame is empty")]
    Empty,

    #[error("frame is not a JPEG image ({len} bytes)")]
    NotJpeg { len: usize },

    #[error("{0}")]
    Other(String),
}

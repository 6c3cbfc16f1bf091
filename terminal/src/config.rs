//! Kiosk configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use kiosk_types::ScanTimings;
use kiosk_utils::LogFormat;

use crate::KioskError;

/// Configuration for one kiosk.
///
/// Can be loaded from a TOML file via [`KioskConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default, so an
/// empty file yields a kiosk pointed at a local verification service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KioskConfig {
    /// Verification endpoint receiving the multipart upload.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Whole-request timeout. Expiry is reported as a connection error.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Latest frame written by the camera service.
    #[serde(default = "default_frame_path")]
    pub frame_path: PathBuf,

    /// A frame older than this makes the feed not-ready.
    #[serde(default = "default_max_frame_age_ms")]
    pub max_frame_age_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to serve Prometheus metrics.
    #[serde(default)]
    pub enable_metrics: bool,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Scan loop timings.
    #[serde(default)]
    pub timings: ScanTimings,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_endpoint_url() -> String {
    "http://127.0.0.1:5000/api/skan".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_frame_path() -> PathBuf {
    PathBuf::from("/run/kiosk/frame.jpg")
}

fn default_max_frame_age_ms() -> u64 {
    2_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_port() -> u16 {
    9464
}

// ── Impl ───────────────────────────────────────────────────────────────

impl KioskConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, KioskError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| KioskError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, KioskError> {
        toml::from_str(s).map_err(|e| KioskError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, KioskError> {
        toml::to_string_pretty(self).map_err(|e| KioskError::Config(e.to_string()))
    }

    /// Reject values the kiosk cannot run with.
    pub fn validate(&self) -> Result<(), KioskError> {
        self.timings.validate()?;

        if !(self.endpoint_url.starts_with("http://") || self.endpoint_url.starts_with("https://"))
        {
            return Err(KioskError::Config(format!(
                "endpoint_url must be an http(s) URL, got `{}`",
                self.endpoint_url
            )));
        }
        for (name, value) in [
            ("request_timeout_ms", self.request_timeout_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("max_frame_age_ms", self.max_frame_age_ms),
        ] {
            if value == 0 {
                return Err(KioskError::Config(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn max_frame_age(&self) -> Duration {
        Duration::from_millis(self.max_frame_age_ms)
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            frame_path: default_frame_path(),
            max_frame_age_ms: default_max_frame_age_ms(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            enable_metrics: false,
            metrics_port: default_metrics_port(),
            timings: ScanTimings::default(),
        }
    }
}

//! Prometheus metrics for the kiosk.
//!
//! [`KioskMetrics`] owns a dedicated [`Registry`] that the daemon's
//! `/metrics` endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::KioskError;

/// Skip reason label: the capture source reported not-ready.
pub const SKIP_NOT_READY: &str = "not_ready";
/// Skip reason label: the source was ready but the still could not be taken.
pub const SKIP_CAPTURE_FAILED: &str = "capture_failed";

/// All kiosk-level Prometheus metrics.
pub struct KioskMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Scan-interval expiries seen by the session.
    pub scan_ticks: IntCounter,
    /// Ticks that did not become an attempt, by reason.
    pub captures_skipped: IntCounterVec,
    /// Attempts that took the lock and were submitted.
    pub attempts_started: IntCounter,
    /// Classified outcomes, by outcome label.
    pub outcomes: IntCounterVec,
    /// Responses that arrived for an attempt no longer outstanding.
    pub late_responses: IntCounter,
    /// Display clock ticks.
    pub clock_ticks: IntCounter,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Submission to outcome, in milliseconds of session time.
    pub verification_latency_ms: Histogram,
}

impl KioskMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> Result<Self, KioskError> {
        let registry = Registry::new();

        let scan_ticks = register_int_counter_with_registry!(
            Opts::new("kiosk_scan_ticks_total", "Scan interval expiries"),
            registry
        )
        .map_err(metrics_error)?;

        let captures_skipped = register_int_counter_vec_with_registry!(
            Opts::new(
                "kiosk_captures_skipped_total",
                "Scan ticks that did not start an attempt"
            ),
            &["reason"],
            registry
        )
        .map_err(metrics_error)?;

        let attempts_started = register_int_counter_with_registry!(
            Opts::new(
                "kiosk_attempts_started_total",
                "Verification attempts submitted"
            ),
            registry
        )
        .map_err(metrics_error)?;

        let outcomes = register_int_counter_vec_with_registry!(
            Opts::new("kiosk_outcomes_total", "Classified verification outcomes"),
            &["outcome"],
            registry
        )
        .map_err(metrics_error)?;

        let late_responses = register_int_counter_with_registry!(
            Opts::new(
                "kiosk_late_responses_total",
                "Verification responses discarded because their attempt was gone"
            ),
            registry
        )
        .map_err(metrics_error)?;

        let clock_ticks = register_int_counter_with_registry!(
            Opts::new("kiosk_clock_ticks_total", "Display clock ticks"),
            registry
        )
        .map_err(metrics_error)?;

        // 5 ms → ~20 s.
        let buckets = prometheus::exponential_buckets(5.0, 2.0, 13).map_err(metrics_error)?;
        let verification_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "kiosk_verification_latency_ms",
                "Verification round trip in milliseconds"
            )
            .buckets(buckets),
            registry
        )
        .map_err(metrics_error)?;

        Ok(Self {
            registry,
            scan_ticks,
            captures_skipped,
            attempts_started,
            outcomes,
            late_responses,
            clock_ticks,
            verification_latency_ms,
        })
    }

    /// Encode every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, KioskError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_error)?;
        String::from_utf8(buffer).map_err(|e| KioskError::Metrics(e.to_string()))
    }

    pub fn record_skip(&self, reason: &str) {
        self.captures_skipped.with_label_values(&[reason]).inc();
    }

    pub fn record_outcome(&self, label: &str, latency_ms: Option<u64>) {
        self.outcomes.with_label_values(&[label]).inc();
        if let Some(ms) = latency_ms {
            self.verification_latency_ms.observe(ms as f64);
        }
    }
}

fn metrics_error(e: prometheus::Error) -> KioskError {
    KioskError::Metrics(e.to_string())
}

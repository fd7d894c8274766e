//! # Uniqueness Checker Metrics
//!
//! Prometheus metrics for batch throughput and verdict mix.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! uniqueness-checker = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `uniqueness_batches_processed_total` - Counter of batches processed
//! - `uniqueness_batch_size` - Histogram of requests per batch
//! - `uniqueness_batch_duration_seconds` - Histogram of batch processing time
//! - `uniqueness_results_total` - Counter of verdicts (by result kind)
//! - `uniqueness_commit_failures_total` - Counter of failed session commits (by exception type)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total batches processed
    pub static ref BATCHES_PROCESSED: IntCounter = register_int_counter!(
        "uniqueness_batches_processed_total",
        "Total number of request batches processed"
    )
    .expect("Failed to create BATCHES_PROCESSED metric");

    /// Requests per batch
    pub static ref BATCH_SIZE: Histogram = register_histogram!(
        "uniqueness_batch_size",
        "Number of requests per batch",
        vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0]
    )
    .expect("Failed to create BATCH_SIZE metric");

    /// Batch processing time
    pub static ref BATCH_DURATION: Histogram = register_histogram!(
        "uniqueness_batch_duration_seconds",
        "Time spent processing one batch"
    )
    .expect("Failed to create BATCH_DURATION metric");

    /// Verdicts, labeled by result kind
    pub static ref RESULTS: IntCounterVec = register_int_counter_vec!(
        "uniqueness_results_total",
        "Total number of verdicts returned",
        &["result"]
    )
    .expect("Failed to create RESULTS metric");

    /// Failed commits, labeled by exception type
    pub static ref COMMIT_FAILURES: IntCounterVec = register_int_counter_vec!(
        "uniqueness_commit_failures_total",
        "Total number of backing store sessions that failed to commit",
        &["exception_type"]
    )
    .expect("Failed to create COMMIT_FAILURES metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a processed batch
#[cfg(feature = "metrics")]
pub fn record_batch(size: usize, duration_secs: f64) {
    BATCHES_PROCESSED.inc();
    BATCH_SIZE.observe(size as f64);
    BATCH_DURATION.observe(duration_secs);
}

/// Record one verdict
#[cfg(feature = "metrics")]
pub fn record_result(label: &str) {
    RESULTS.with_label_values(&[label]).inc();
}

/// Record a failed commit
#[cfg(feature = "metrics")]
pub fn record_commit_failure(exception_type: &str) {
    COMMIT_FAILURES.with_label_values(&[exception_type]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_batch(_size: usize, _duration_secs: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_result(_label: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_commit_failure(_exception_type: &str) {}

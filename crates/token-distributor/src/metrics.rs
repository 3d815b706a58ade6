//! # Distributor Metrics
//!
//! Prometheus metrics for monitoring distribution activity.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! token-distributor = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `distributor_distributions_total` - Committed distributions (by asset)
//! - `distributor_payouts_total` - Individual payouts made
//! - `distributor_failures_total` - Aborted calls (by error category)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Committed distributions, labeled by asset kind
    pub static ref DISTRIBUTIONS: IntCounterVec = register_int_counter_vec!(
        "distributor_distributions_total",
        "Total number of committed distributions",
        &["asset"]
    )
    .expect("Failed to create DISTRIBUTIONS metric");

    /// Individual payouts made by committed distributions
    pub static ref PAYOUTS: IntCounter = register_int_counter!(
        "distributor_payouts_total",
        "Total number of payouts made"
    )
    .expect("Failed to create PAYOUTS metric");

    /// Aborted calls, labeled by error category
    pub static ref FAILURES: IntCounterVec = register_int_counter_vec!(
        "distributor_failures_total",
        "Total number of aborted calls",
        &["category"]
    )
    .expect("Failed to create FAILURES metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a committed distribution
#[cfg(feature = "metrics")]
pub fn record_distribution(asset: &str, payouts: usize) {
    DISTRIBUTIONS.with_label_values(&[asset]).inc();
    PAYOUTS.inc_by(payouts as u64);
}

/// Record an aborted call
#[cfg(feature = "metrics")]
pub fn record_failure(category: &str) {
    FAILURES.with_label_values(&[category]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_distribution(_asset: &str, _payouts: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_failure(_category: &str) {}

//! Metrics utilities module
//!
//! Counters for the checkout flow. One instance is shared between the
//! controller and the service through an `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use serde::{Deserialize, Serialize};

/// Point-in-time copy of the checkout counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutMetricsSnapshot {
    /// Submit actions received
    pub submissions: u64,

    /// Submits stopped by field validation
    pub validation_rejections: u64,

    /// Submits ignored because a charge was already in flight
    pub duplicate_submissions: u64,

    /// Charges approved by the gateway
    pub gateway_successes: u64,

    /// Charges that failed, declined or timed out
    pub gateway_failures: u64,

    /// Confirmations the backend refused or never received
    pub confirmation_failures: u64,

    /// Average gateway round trip in milliseconds
    pub avg_gateway_time_ms: f64,

    /// Uptime in seconds
    pub uptime_seconds: u64,
}

/// Checkout metrics
pub struct CheckoutMetrics {
    submissions: AtomicU64,
    validation_rejections: AtomicU64,
    duplicate_submissions: AtomicU64,
    gateway_successes: AtomicU64,
    gateway_failures: AtomicU64,
    confirmation_failures: AtomicU64,
    total_gateway_time: AtomicU64,
    gateway_calls: AtomicU64,
    start_time: SystemTime,
}

impl CheckoutMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            submissions: AtomicU64::new(0),
            validation_rejections: AtomicU64::new(0),
            duplicate_submissions: AtomicU64::new(0),
            gateway_successes: AtomicU64::new(0),
            gateway_failures: AtomicU64::new(0),
            confirmation_failures: AtomicU64::new(0),
            total_gateway_time: AtomicU64::new(0),
            gateway_calls: AtomicU64::new(0),
            start_time: SystemTime::now(),
        }
    }

    pub fn increment_submissions(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validation_rejections(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_duplicate_submissions(&self) {
        self.duplicate_submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_confirmation_failures(&self) {
        self.confirmation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished gateway call and its duration
    pub fn record_gateway_call(&self, success: bool, duration_ms: u64) {
        if success {
            self.gateway_successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.gateway_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.total_gateway_time.fetch_add(duration_ms, Ordering::Relaxed);
        self.gateway_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics
    pub fn snapshot(&self) -> CheckoutMetricsSnapshot {
        let total_gateway_time = self.total_gateway_time.load(Ordering::Relaxed);
        let gateway_calls = self.gateway_calls.load(Ordering::Relaxed);

        let avg_gateway_time_ms = if gateway_calls > 0 {
            total_gateway_time as f64 / gateway_calls as f64
        } else {
            0.0
        };

        let uptime = SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();

        CheckoutMetricsSnapshot {
            submissions: self.submissions.load(Ordering::Relaxed),
            validation_rejections: self.validation_rejections.load(Ordering::Relaxed),
            duplicate_submissions: self.duplicate_submissions.load(Ordering::Relaxed),
            gateway_successes: self.gateway_successes.load(Ordering::Relaxed),
            gateway_failures: self.gateway_failures.load(Ordering::Relaxed),
            confirmation_failures: self.confirmation_failures.load(Ordering::Relaxed),
            avg_gateway_time_ms,
            uptime_seconds: uptime,
        }
    }
}

impl Default for CheckoutMetrics {
    fn default() -> Self {
        Self::new()
    }
}

//! Shared utilities and common functionality
//!
//! This module contains error handling, logging and metrics used across the
//! checkout core.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{AppError, AppResult, CheckoutError};
pub use logging::LoggingUtils;
pub use metrics::{CheckoutMetrics, CheckoutMetricsSnapshot};

//! Logging utilities module
//!
//! This module provides centralized logging functionality and the structured
//! log lines emitted at checkout transitions.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::payment_method::MethodTag;
use crate::domain::validation::{ValidationField, ValidationReason};
use crate::shared::error::AppError;

/// Logging utilities for the application
pub struct LoggingUtils;

impl LoggingUtils {
    /// Initialize logging with the specified level
    pub fn initialize(level: &str) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level));

        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }

    /// Log a checkout session being opened
    pub fn log_session_opened(donation_ref: &str, recipient: &str, amount: Decimal) {
        info!(
            donation_ref = %donation_ref,
            recipient = %recipient,
            amount = %amount,
            "Checkout session opened"
        );
    }

    /// Log a validation rejection
    pub fn log_validation_rejected(method: MethodTag, field: ValidationField, reason: ValidationReason) {
        warn!(
            method = %method,
            field = %field,
            reason = %reason,
            "Payment details rejected"
        );
    }

    /// Log a charge attempt leaving for the gateway
    pub fn log_submission_started(donation_ref: &str, method: MethodTag, amount: Decimal) {
        info!(
            donation_ref = %donation_ref,
            method = %method,
            amount = %amount,
            "Submitting payment"
        );
    }

    /// Log a gateway outcome
    pub fn log_gateway_result(donation_ref: &str, method: MethodTag, result: Result<&str, &str>, duration_ms: u64) {
        match result {
            Ok(transaction_id) => info!(
                donation_ref = %donation_ref,
                method = %method,
                transaction_id = %transaction_id,
                duration_ms = %duration_ms,
                "Payment succeeded"
            ),
            Err(reason) => warn!(
                donation_ref = %donation_ref,
                method = %method,
                reason = %reason,
                duration_ms = %duration_ms,
                "Payment failed"
            ),
        }
    }
}

//! Error handling module
//!
//! This module provides centralized error handling for the checkout core.

use thiserror::Error;

use crate::domain::payments::{GatewayError, PaymentReceipt};

/// Application error types
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Confirmation error: {0}")]
    Confirmation(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON serialization error: {0}")]
    Json(String),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the user can fix this by changing input or trying again
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Validation(_) => true,
            AppError::Gateway(e) => e.is_retryable(),
            AppError::Checkout(e) => matches!(e, CheckoutError::SubmissionInProgress),
            _ => false,
        }
    }
}

/// Errors raised by the checkout flow itself
#[derive(Error, Debug, Clone)]
pub enum CheckoutError {
    #[error("Invalid pending donation: {0}")]
    InvalidDonation(String),

    #[error("No pending donation to check out")]
    NoPendingDonation,

    #[error("A payment is already being processed")]
    SubmissionInProgress,

    #[error("Checkout session is closed")]
    SessionClosed,

    #[error("No completed payment to confirm")]
    NotPaid,

    #[error("Operation requires the {expected} method but {active} is active")]
    WrongMethod { expected: String, active: String },

    #[error("Payment {} succeeded but confirmation failed: {reason}", .receipt.transaction_id)]
    Confirmation { receipt: PaymentReceipt, reason: String },
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

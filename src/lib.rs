//! CureRise checkout - payment flow core for the donation platform
//!
//! This library turns a pending donation into a paid one: it keeps the
//! checkout session state, formats and validates payment details, runs the
//! QR code countdown and submits the charge exactly once.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

#[cfg(test)]
mod tests;

pub use application::{CheckoutService, CheckoutSession, SharedSession, SubmitOutcome};
pub use config::AppConfig;
pub use shared::error::{AppError, AppResult, CheckoutError};

/// Application result type
pub type Result<T> = std::result::Result<T, shared::error::AppError>;

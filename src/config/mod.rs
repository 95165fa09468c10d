//! Configuration management module
//!
//! This module handles loading, validation, and access to checkout settings.

pub mod app_config;
pub mod validation;

pub use app_config::{AppConfig, ConfirmationConfig, DonationConfig, GatewayConfig, LoggingConfig, QrConfig};
pub use validation::ConfigValidator;

//! Application configuration structures
//!
//! This module contains the configuration structures for the checkout core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::donation::DonationLimits;

/// QR code countdown configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QrConfig {
    /// Lifetime of a generated QR code in seconds
    #[validate(range(min = 1, max = 3600))]
    pub ttl_seconds: u32,

    /// Countdown tick period in milliseconds
    #[validate(range(min = 10, max = 60000))]
    pub tick_interval_ms: u64,

    /// Start the countdown when the page loads instead of when QR is picked
    pub start_on_load: bool,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 600, // 10 minutes
            tick_interval_ms: 1000,
            start_on_load: false,
        }
    }
}

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GatewayConfig {
    /// Processing delay of the simulated gateway
    #[validate(range(max = 60000))]
    pub simulated_delay_ms: u64,

    /// Upper bound on a single charge attempt
    #[validate(range(min = 100, max = 120000))]
    pub timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: 3000,
            timeout_ms: 15000,
        }
    }
}

/// Donation confirmation endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Base URL of the donation API
    #[validate(url)]
    pub base_url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64,

    /// Retries on transport failure
    #[validate(range(min = 0, max = 10))]
    pub max_retries: u32,

    /// Bearer token of the signed-in donor
    pub auth_token: Option<String>,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_seconds: 10,
            max_retries: 2,
            auth_token: None,
        }
    }
}

/// Minimum donation amounts in rupees
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DonationConfig {
    #[validate(range(min = 1))]
    pub min_amount: u32,

    #[validate(range(min = 1))]
    pub emergency_min_amount: u32,
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            min_amount: 100,
            emergency_min_amount: 500,
        }
    }
}

impl DonationConfig {
    pub fn limits(&self) -> DonationLimits {
        DonationLimits {
            min_amount: Decimal::from(self.min_amount),
            emergency_min_amount: Decimal::from(self.emergency_min_amount),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    #[validate(length(min = 1))]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// QR countdown configuration
    pub qr: QrConfig,

    /// Gateway configuration
    pub gateway: GatewayConfig,

    /// Confirmation endpoint configuration
    pub confirmation: ConfirmationConfig,

    /// Donation limits
    pub donation: DonationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("Checkout").required(false))
            .add_source(config::Environment::with_prefix("CURERISE_CHECKOUT").separator("__"))
            .build()
            .map_err(|e| crate::shared::error::AppError::Config(format!("Failed to build configuration: {}", e)))?;

        let config: AppConfig = config.try_deserialize()
            .map_err(|e| crate::shared::error::AppError::Config(format!("Failed to deserialize configuration: {}", e)))?;

        config.validate_config()
            .map_err(|e| crate::shared::error::AppError::Validation(format!("Configuration validation failed: {}", e)))?;

        crate::config::ConfigValidator::validate_config(&config)?;

        Ok(config)
    }

    /// Validate every section
    pub fn validate_config(&self) -> Result<(), validator::ValidationErrors> {
        self.qr.validate()?;
        self.gateway.validate()?;
        self.confirmation.validate()?;
        self.donation.validate()?;
        self.logging.validate()?;

        Ok(())
    }
}

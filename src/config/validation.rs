//! Configuration validation module
//!
//! Cross-field rules the validator derive cannot express.

use crate::config::app_config::{AppConfig, ConfirmationConfig, DonationConfig, GatewayConfig, QrConfig};
use crate::shared::error::AppError;

/// Configuration validator for additional validation logic
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the complete configuration
    pub fn validate_config(config: &AppConfig) -> crate::Result<()> {
        Self::validate_qr_config(&config.qr)?;
        Self::validate_gateway_config(&config.gateway)?;
        Self::validate_confirmation_config(&config.confirmation)?;
        Self::validate_donation_config(&config.donation)?;

        Ok(())
    }

    /// The countdown has to tick at least once before the code expires
    fn validate_qr_config(qr: &QrConfig) -> crate::Result<()> {
        if qr.tick_interval_ms > u64::from(qr.ttl_seconds) * 1000 {
            return Err(AppError::Validation(
                "QR tick interval cannot be longer than the QR lifetime".to_string()
            ));
        }
        Ok(())
    }

    fn validate_gateway_config(gateway: &GatewayConfig) -> crate::Result<()> {
        if gateway.simulated_delay_ms >= gateway.timeout_ms {
            return Err(AppError::Validation(
                "Gateway timeout must be longer than the simulated processing delay".to_string()
            ));
        }
        Ok(())
    }

    fn validate_confirmation_config(confirmation: &ConfirmationConfig) -> crate::Result<()> {
        let url = &confirmation.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Validation(
                "Confirmation URL must start with http:// or https://".to_string()
            ));
        }

        if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
            tracing::warn!(base_url = %url, "Donation confirmations are sent over plain HTTP");
        }

        if let Some(token) = &confirmation.auth_token {
            if token.trim().is_empty() {
                return Err(AppError::Validation(
                    "Confirmation auth token is set but empty".to_string()
                ));
            }
        }

        Ok(())
    }

    fn validate_donation_config(donation: &DonationConfig) -> crate::Result<()> {
        if donation.emergency_min_amount < donation.min_amount {
            return Err(AppError::Validation(
                "Emergency fund minimum cannot be below the general minimum".to_string()
            ));
        }
        Ok(())
    }
}

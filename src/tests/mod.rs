//! Cross-component test suite for the checkout core
//!
//! - `common`: mock gateway, recording confirmer and donation fixtures
//! - `integration`: end-to-end checkout scenarios on virtual time

pub mod common;
pub mod integration;

/// Test configuration and utilities
pub mod config {
    use crate::config::AppConfig;
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Initialize test environment
    pub fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter("debug")
                .with_test_writer()
                .try_init();
        });
    }

    /// Configuration used by the checkout scenarios
    pub fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.gateway.simulated_delay_ms = 3000;
        config.gateway.timeout_ms = 15_000;
        config.confirmation.max_retries = 0;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValidator;

    #[test]
    fn test_config_is_valid() {
        config::init();
        let test_config = config::test_config();
        assert!(test_config.validate_config().is_ok());
        assert!(ConfigValidator::validate_config(&test_config).is_ok());
    }
}

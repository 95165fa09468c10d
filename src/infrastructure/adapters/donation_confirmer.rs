//! Donation confirmation adapter
//!
//! Tells the donation API that a donation has been paid:
//! `PUT {base_url}/donations/{reference}/confirm`.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ConfirmationConfig;
use crate::domain::payments::{DonationConfirmation, DonationConfirmer};
use crate::shared::error::{AppError, AppResult};

pub struct HttpDonationConfirmer {
    config: ConfirmationConfig,
    client: Client,
}

impl HttpDonationConfirmer {
    pub fn new(config: ConfirmationConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// The reference is pushed as one path segment, so `/`, `?` and `#`
    /// in it are percent-encoded instead of reshaping the URL.
    fn confirm_url(&self, reference: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| AppError::Config(format!("Invalid donation API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("Donation API URL cannot take a path: {}", self.config.base_url)))?
            .pop_if_empty()
            .extend(["donations", reference, "confirm"]);
        Ok(url)
    }
}

#[async_trait]
impl DonationConfirmer for HttpDonationConfirmer {
    async fn confirm(&self, confirmation: &DonationConfirmation) -> AppResult<()> {
        let Some(reference) = confirmation.reference.as_deref() else {
            // Quick donations have no backend record to update.
            info!(
                transaction_id = %confirmation.transaction_id,
                "No donation reference; skipping confirmation call"
            );
            return Ok(());
        };

        let url = self.confirm_url(reference)?;
        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            let mut request = self.client.put(url.clone()).json(confirmation);
            if let Some(token) = &self.config.auth_token {
                request = request.bearer_auth(token);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    info!(
                        donation_ref = %reference,
                        transaction_id = %confirmation.transaction_id,
                        "Donation confirmed"
                    );
                    return Ok(());
                }
                Ok(response) => {
                    // The server answered; retrying will not change its mind.
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::Confirmation(format!(
                        "donation API returned {}: {}",
                        status, body
                    )));
                }
                Err(e) => {
                    last_error = Some(e.to_string());
                }
            }

            if attempt < self.config.max_retries {
                warn!(
                    donation_ref = %reference,
                    "Confirmation request failed, retrying... (attempt {}/{})",
                    attempt + 1,
                    self.config.max_retries + 1
                );
                tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt + 1))).await;
            }
        }

        Err(AppError::Confirmation(format!(
            "confirmation failed after {} attempts: {}",
            self.config.max_retries + 1,
            last_error.unwrap_or_default()
        )))
    }
}

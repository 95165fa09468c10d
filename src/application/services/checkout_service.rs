//! Checkout service wiring the pending donation, the submission controller
//! and the donation confirmation together

use std::sync::Arc;
use tracing::{error, info};

use crate::application::services::checkout_session::{CheckoutSession, SharedSession};
use crate::application::services::submission_controller::{SubmissionController, SubmitOutcome};
use crate::config::AppConfig;
use crate::domain::payments::{DonationConfirmation, DonationConfirmer, PaymentGateway, PaymentReceipt};
use crate::infrastructure::adapters::PendingDonationStore;
use crate::shared::error::CheckoutError;
use crate::shared::metrics::{CheckoutMetrics, CheckoutMetricsSnapshot};

pub struct CheckoutService {
    config: Arc<AppConfig>,
    store: PendingDonationStore,
    controller: SubmissionController,
    confirmer: Arc<dyn DonationConfirmer>,
    metrics: Arc<CheckoutMetrics>,
}

impl CheckoutService {
    pub fn new(
        config: Arc<AppConfig>,
        store: PendingDonationStore,
        gateway: Arc<dyn PaymentGateway>,
        confirmer: Arc<dyn DonationConfirmer>,
    ) -> Self {
        let metrics = Arc::new(CheckoutMetrics::new());
        let controller = SubmissionController::new(gateway, &config.gateway, metrics.clone());
        Self {
            config,
            store,
            controller,
            confirmer,
            metrics,
        }
    }

    /// Open a session on the stored pending donation
    pub async fn open(&self) -> Result<SharedSession, CheckoutError> {
        let donation = self.store.get().await.ok_or(CheckoutError::NoPendingDonation)?;
        donation.validate(&self.config.donation.limits())?;
        Ok(CheckoutSession::initialize(donation, &self.config.qr).into_shared())
    }

    /// Submit the session's payment; a successful charge is confirmed once
    pub async fn submit(&self, session: &SharedSession) -> Result<SubmitOutcome, CheckoutError> {
        let outcome = self.controller.submit(session).await?;

        if let SubmitOutcome::Succeeded(receipt) = &outcome {
            self.confirm_receipt(receipt).await?;
        }

        Ok(outcome)
    }

    /// Confirm a paid session again after an earlier confirmation failed
    pub async fn retry_confirmation(&self, session: &SharedSession) -> Result<(), CheckoutError> {
        let receipt = session.lock().await.receipt().cloned().ok_or(CheckoutError::NotPaid)?;
        self.confirm_receipt(&receipt).await
    }

    async fn confirm_receipt(&self, receipt: &PaymentReceipt) -> Result<(), CheckoutError> {
        let confirmation = DonationConfirmation::from(receipt);
        if let Err(e) = self.confirmer.confirm(&confirmation).await {
            self.metrics.increment_confirmation_failures();
            error!(
                transaction_id = %receipt.transaction_id,
                error = %e,
                "Payment succeeded but donation confirmation failed"
            );
            return Err(CheckoutError::Confirmation {
                receipt: receipt.clone(),
                reason: e.to_string(),
            });
        }
        self.store.clear().await;
        info!(transaction_id = %receipt.transaction_id, "Checkout completed");
        Ok(())
    }

    /// Abandon checkout and drop the pending donation
    pub async fn cancel(&self, session: &SharedSession) -> Result<(), CheckoutError> {
        session.lock().await.cancel()?;
        self.store.clear().await;
        Ok(())
    }

    pub fn metrics(&self) -> CheckoutMetricsSnapshot {
        self.metrics.snapshot()
    }
}

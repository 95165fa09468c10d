//! Submission controller
//!
//! Runs one submit attempt against a shared session: validate, snapshot the
//! charge, call the gateway without holding the session lock, then record the
//! outcome. A second submit while one is in flight never reaches the gateway.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::application::services::checkout_session::{SharedSession, SubmissionState};
use crate::config::GatewayConfig;
use crate::domain::payments::{ChargeRequest, GatewayError, PaymentGateway, PaymentReceipt};
use crate::domain::validation::ValidationResult;
use crate::shared::error::CheckoutError;
use crate::shared::logging::LoggingUtils;
use crate::shared::metrics::CheckoutMetrics;

/// Result of a submit action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Charge approved; the session is now terminal
    Succeeded(PaymentReceipt),
    /// Field validation failed; nothing was sent
    Rejected(ValidationResult),
    /// Gateway refused or did not answer; the user may retry
    Failed(GatewayError),
    /// Another submit is still waiting on the gateway
    InFlight,
    /// The donation was already paid in this session
    AlreadyCompleted,
}

pub struct SubmissionController {
    gateway: Arc<dyn PaymentGateway>,
    timeout: Duration,
    metrics: Arc<CheckoutMetrics>,
}

impl SubmissionController {
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: &GatewayConfig, metrics: Arc<CheckoutMetrics>) -> Self {
        Self {
            gateway,
            timeout: Duration::from_millis(config.timeout_ms),
            metrics,
        }
    }

    pub async fn submit(&self, session: &SharedSession) -> Result<SubmitOutcome, CheckoutError> {
        self.metrics.increment_submissions();

        let (request, donation_ref) = {
            let mut guard = session.lock().await;

            if guard.is_cancelled() {
                return Err(CheckoutError::SessionClosed);
            }
            match guard.submission_state() {
                SubmissionState::Succeeded => return Ok(SubmitOutcome::AlreadyCompleted),
                state if state.is_in_flight() => {
                    self.metrics.increment_duplicate_submissions();
                    debug!("Submit ignored; payment already in flight");
                    return Ok(SubmitOutcome::InFlight);
                }
                _ => {}
            }

            guard.transition(SubmissionState::Validating);
            let result = guard.validate();
            if let ValidationResult::Invalid { field, reason } = result {
                self.metrics.increment_validation_rejections();
                LoggingUtils::log_validation_rejected(guard.active_tag(), field, reason);
                guard.transition(SubmissionState::Idle);
                return Ok(SubmitOutcome::Rejected(result));
            }

            let request = guard.charge_request();
            let donation_ref = request.donation_ref.clone().unwrap_or_else(|| "-".to_string());
            LoggingUtils::log_submission_started(&donation_ref, request.method.tag(), request.amount);
            guard.transition(SubmissionState::Submitting);
            (request, donation_ref)
        };

        // The charge and its bookkeeping run as their own task, so a caller
        // that stops waiting cannot leave the session stuck in Submitting.
        let charge = tokio::spawn(Self::charge_and_record(
            self.gateway.clone(),
            self.timeout,
            self.metrics.clone(),
            session.clone(),
            request,
            donation_ref,
        ));

        match charge.await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let error = GatewayError::Network(format!("charge task ended early: {}", e));
                let mut guard = session.lock().await;
                if guard.submission_state() == &SubmissionState::Submitting {
                    guard.record_failure(error.clone());
                }
                Ok(SubmitOutcome::Failed(error))
            }
        }
    }

    async fn charge_and_record(
        gateway: Arc<dyn PaymentGateway>,
        timeout: Duration,
        metrics: Arc<CheckoutMetrics>,
        session: SharedSession,
        request: ChargeRequest,
        donation_ref: String,
    ) -> SubmitOutcome {
        let started = Instant::now();
        let result = match tokio::time::timeout(timeout, gateway.charge(&request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(timeout.as_millis() as u64)),
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        metrics.record_gateway_call(result.is_ok(), duration_ms);

        let method = request.method.tag();
        let mut guard = session.lock().await;
        match result {
            Ok(gateway_receipt) => {
                LoggingUtils::log_gateway_result(&donation_ref, method, Ok(gateway_receipt.transaction_id.as_str()), duration_ms);
                let receipt = PaymentReceipt {
                    transaction_id: gateway_receipt.transaction_id,
                    donation_ref: request.donation_ref,
                    method,
                    amount: request.amount,
                    paid_at: gateway_receipt.processed_at,
                };
                guard.record_success(receipt.clone());
                SubmitOutcome::Succeeded(receipt)
            }
            Err(error) => {
                LoggingUtils::log_gateway_result(&donation_ref, method, Err(error.to_string().as_str()), duration_ms);
                guard.record_failure(error.clone());
                SubmitOutcome::Failed(error)
            }
        }
    }
}

//! Common test utilities and mock implementations
//!
//! This module provides shared mocks and fixtures used across the
//! cross-component tests.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::application::CheckoutService;
use crate::config::AppConfig;
use crate::domain::donation::{DonationKind, PendingDonation};
use crate::domain::payments::{
    ChargeRequest, DonationConfirmation, DonationConfirmer, GatewayError, GatewayReceipt, PaymentGateway,
};
use crate::infrastructure::adapters::PendingDonationStore;
use crate::shared::error::{AppError, AppResult};

/// Mock payment gateway with scripted outcomes
pub struct MockGateway {
    delay: Duration,
    outcomes: Mutex<VecDeque<Result<(), GatewayError>>>,
    requests: Mutex<Vec<ChargeRequest>>,
}

impl MockGateway {
    /// Create a gateway that approves after `delay`
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue the outcome of the next unscripted charge
    pub async fn push_outcome(&self, outcome: Result<(), GatewayError>) {
        self.outcomes.lock().await.push_back(outcome);
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Charges received so far, in order
    pub async fn requests(&self) -> Vec<ChargeRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<GatewayReceipt, GatewayError> {
        self.requests.lock().await.push(request.clone());
        tokio::time::sleep(self.delay).await;

        let outcome = self.outcomes.lock().await.pop_front().unwrap_or(Ok(()));
        outcome.map(|_| GatewayReceipt {
            transaction_id: format!("txn_mock_{}", uuid::Uuid::new_v4().simple()),
            processed_at: Utc::now(),
        })
    }
}

/// Donation confirmer that records every call
#[derive(Default)]
pub struct RecordingConfirmer {
    confirmations: Mutex<Vec<DonationConfirmation>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingConfirmer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following confirmation fail
    pub async fn fail_with(&self, reason: &str) {
        *self.fail_with.lock().await = Some(reason.to_string());
    }

    /// Let following confirmations succeed again
    pub async fn recover(&self) {
        *self.fail_with.lock().await = None;
    }

    pub async fn confirmations(&self) -> Vec<DonationConfirmation> {
        self.confirmations.lock().await.clone()
    }
}

#[async_trait]
impl DonationConfirmer for RecordingConfirmer {
    async fn confirm(&self, confirmation: &DonationConfirmation) -> AppResult<()> {
        self.confirmations.lock().await.push(confirmation.clone());
        match self.fail_with.lock().await.as_ref() {
            Some(reason) => Err(AppError::Confirmation(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Test fixtures
pub mod fixtures {
    use super::*;

    pub fn patient_donation(amount: i64) -> PendingDonation {
        PendingDonation::new(DonationKind::PatientDonation, "Patient X", "City Hospital", Decimal::from(amount))
            .unwrap()
            .with_context_id("patient-42")
            .with_donation_id("don-1001")
    }

    pub fn quick_donation(amount: i64) -> PendingDonation {
        PendingDonation::new(
            DonationKind::QuickDonation,
            "Urgent Medical Cases",
            "Multiple Partner Hospitals",
            Decimal::from(amount),
        )
        .unwrap()
    }
}

/// A checkout service wired to mocks
pub struct Harness {
    pub service: CheckoutService,
    pub store: PendingDonationStore,
    pub gateway: Arc<MockGateway>,
    pub confirmer: Arc<RecordingConfirmer>,
}

impl Harness {
    pub fn new(config: AppConfig) -> Self {
        let store = PendingDonationStore::new(config.donation.limits());
        let gateway = Arc::new(MockGateway::new(Duration::from_millis(config.gateway.simulated_delay_ms)));
        let confirmer = Arc::new(RecordingConfirmer::new());
        let service = CheckoutService::new(Arc::new(config), store.clone(), gateway.clone(), confirmer.clone());
        Self { service, store, gateway, confirmer }
    }

    /// Harness with a pending donation already stored
    pub async fn with_donation(donation: PendingDonation) -> Self {
        super::config::init();
        let harness = Self::new(super::config::test_config());
        harness.store.put(donation).await.unwrap();
        harness
    }
}

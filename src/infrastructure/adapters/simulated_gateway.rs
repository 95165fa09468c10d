//! Simulated payment gateway
//!
//! Approves every charge after a fixed processing delay. Outcomes can be
//! scripted ahead of time to exercise declines and outages.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::domain::payments::{ChargeRequest, GatewayError, GatewayReceipt, PaymentGateway};

pub struct SimulatedGateway {
    delay: Duration,
    scripted: Mutex<VecDeque<Result<(), GatewayError>>>,
    calls: AtomicUsize,
}

impl SimulatedGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.simulated_delay_ms),
            scripted: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue the outcome of a future charge. Unscripted charges are approved.
    pub fn script(&self, outcome: Result<(), GatewayError>) {
        // A poisoned queue only means a test thread panicked mid-push.
        let mut queue = self.scripted.lock().unwrap_or_else(|e| e.into_inner());
        queue.push_back(outcome);
    }

    /// Charges received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Result<(), GatewayError> {
        let mut queue = self.scripted.lock().unwrap_or_else(|e| e.into_inner());
        queue.pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<GatewayReceipt, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        info!(
            method = %request.method.tag(),
            amount = %request.amount,
            delay_ms = self.delay.as_millis() as u64,
            "Simulated gateway processing charge"
        );

        tokio::time::sleep(self.delay).await;
        self.next_outcome()?;

        Ok(GatewayReceipt {
            transaction_id: format!("txn_{}", Uuid::new_v4().simple()),
            processed_at: Utc::now(),
        })
    }
}

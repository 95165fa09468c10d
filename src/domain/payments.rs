//! Payments domain models and the ports to the payment processor and the
//! donation backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::payment_method::{MethodTag, PaymentMethod};
use crate::shared::error::AppResult;

/// Snapshot handed to the gateway once validation has passed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub donation_ref: Option<String>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub requested_at: DateTime<Utc>,
}

/// Gateway acknowledgement of an approved charge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayReceipt {
    pub transaction_id: String,
    pub processed_at: DateTime<Utc>,
}

/// Ways a charge attempt can fail
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum GatewayError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment timed out after {0} ms")]
    Timeout(u64),

    #[error("network failure: {0}")]
    Network(String),

    #[error("payment processor unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// A declined charge needs different payment details, not another try
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GatewayError::Declined(_))
    }
}

/// Payment processor port
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<GatewayReceipt, GatewayError>;
}

/// Terminal result of a successful checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub donation_ref: Option<String>,
    pub method: MethodTag,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// Body of the donation confirmation call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DonationConfirmation {
    #[serde(skip)]
    pub reference: Option<String>,
    pub transaction_id: String,
    #[serde(rename = "payment_method")]
    pub method: MethodTag,
    pub amount: Decimal,
    pub confirmed_at: DateTime<Utc>,
}

impl From<&PaymentReceipt> for DonationConfirmation {
    fn from(receipt: &PaymentReceipt) -> Self {
        Self {
            reference: receipt.donation_ref.clone(),
            transaction_id: receipt.transaction_id.clone(),
            method: receipt.method,
            amount: receipt.amount,
            confirmed_at: receipt.paid_at,
        }
    }
}

/// Donation backend port; marks the donation record as paid
#[async_trait]
pub trait DonationConfirmer: Send + Sync {
    async fn confirm(&self, confirmation: &DonationConfirmation) -> AppResult<()>;
}

//! Pending donation context handed to checkout by the upstream donation flows

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::error::CheckoutError;

/// Which upstream flow produced the pending donation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DonationKind {
    #[default]
    PatientDonation,
    FoodBank,
    EmergencyFund,
    QuickDonation,
}

impl DonationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationKind::PatientDonation => "patient-donation",
            DonationKind::FoodBank => "food-bank",
            DonationKind::EmergencyFund => "emergency-fund",
            DonationKind::QuickDonation => "quick-donation",
        }
    }

    /// Smallest amount the flow accepts
    pub fn minimum_amount(&self, limits: &DonationLimits) -> Decimal {
        match self {
            DonationKind::EmergencyFund => limits.emergency_min_amount,
            _ => limits.min_amount,
        }
    }
}

/// Minimum amounts enforced on incoming donations, in rupees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationLimits {
    pub min_amount: Decimal,
    pub emergency_min_amount: Decimal,
}

impl Default for DonationLimits {
    fn default() -> Self {
        Self {
            min_amount: Decimal::from(100),
            emergency_min_amount: Decimal::from(500),
        }
    }
}

/// Donation established before checkout begins. Read-only to checkout.
///
/// The serialized field names match the record the donation pages store
/// (`recipient`, `hospital`, `patientId`, `donationId`, `timestamp`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingDonation {
    #[serde(rename = "type", default)]
    pub kind: DonationKind,
    #[serde(rename = "recipient")]
    pub recipient_label: String,
    #[serde(rename = "hospital")]
    pub hospital_label: String,
    pub amount: Decimal,
    #[serde(rename = "patientId", alias = "campaignId", default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(rename = "donationId", default, skip_serializing_if = "Option::is_none")]
    pub donation_id: Option<String>,
    #[serde(rename = "timestamp", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl PendingDonation {
    /// Build a pending donation checked against the default limits
    pub fn new(
        kind: DonationKind,
        recipient_label: impl Into<String>,
        hospital_label: impl Into<String>,
        amount: Decimal,
    ) -> Result<Self, CheckoutError> {
        let donation = Self {
            kind,
            recipient_label: recipient_label.into(),
            hospital_label: hospital_label.into(),
            amount,
            context_id: None,
            donation_id: None,
            created_at: Utc::now(),
        };
        donation.validate(&DonationLimits::default())?;
        Ok(donation)
    }

    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    pub fn with_donation_id(mut self, donation_id: impl Into<String>) -> Self {
        self.donation_id = Some(donation_id.into());
        self
    }

    /// Check labels and amount against the given limits
    pub fn validate(&self, limits: &DonationLimits) -> Result<(), CheckoutError> {
        if self.recipient_label.trim().is_empty() {
            return Err(CheckoutError::InvalidDonation("recipient is required".into()));
        }
        if self.hospital_label.trim().is_empty() {
            return Err(CheckoutError::InvalidDonation("hospital is required".into()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(CheckoutError::InvalidDonation("amount must be positive".into()));
        }
        let minimum = self.kind.minimum_amount(limits);
        if self.amount < minimum {
            return Err(CheckoutError::InvalidDonation(format!(
                "amount {} is below the {} minimum of {}",
                self.amount,
                self.kind.as_str(),
                minimum
            )));
        }
        Ok(())
    }

    /// Identifier the confirmation endpoint knows this donation by
    pub fn reference(&self) -> Option<&str> {
        self.donation_id.as_deref().or(self.context_id.as_deref())
    }
}

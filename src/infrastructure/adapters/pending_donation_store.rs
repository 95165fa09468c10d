//! Pending donation store
//!
//! Holds the donation the upstream pages hand to checkout. The record is
//! kept in the same JSON shape those pages write, so a raw payload can be
//! loaded as-is.

use crate::domain::donation::{DonationLimits, PendingDonation};
use crate::shared::error::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct PendingDonationStore {
    limits: DonationLimits,
    slot: Arc<RwLock<Option<PendingDonation>>>,
}

impl PendingDonationStore {
    pub fn new(limits: DonationLimits) -> Self {
        Self {
            limits,
            slot: Arc::new(RwLock::new(None)),
        }
    }

    /// Store a donation, replacing any earlier one
    pub async fn put(&self, donation: PendingDonation) -> AppResult<()> {
        donation.validate(&self.limits)?;
        debug!(kind = donation.kind.as_str(), amount = %donation.amount, "Pending donation stored");
        *self.slot.write().await = Some(donation);
        Ok(())
    }

    /// Store a donation from its serialized form
    pub async fn put_raw(&self, json: &str) -> AppResult<()> {
        let donation: PendingDonation = serde_json::from_str(json)
            .map_err(|e| AppError::Json(format!("deserialize pending donation: {}", e)))?;
        self.put(donation).await
    }

    pub async fn get(&self) -> Option<PendingDonation> {
        self.slot.read().await.clone()
    }

    /// Remove the record once checkout has finished with it
    pub async fn clear(&self) {
        if self.slot.write().await.take().is_none() {
            warn!("Cleared pending donation store that was already empty");
        }
    }
}

//! Infrastructure layer - External concerns and adapters
//!
//! Implementations of the payment gateway and donation confirmation ports,
//! plus the pending donation store.

pub mod adapters;

pub use adapters::{HttpDonationConfirmer, PendingDonationStore, SimulatedGateway};

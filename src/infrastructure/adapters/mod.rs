//! Infrastructure adapters module
//!
//! This module contains adapters for external services and infrastructure concerns.

pub mod donation_confirmer;
pub mod pending_donation_store;
pub mod simulated_gateway;

pub use donation_confirmer::HttpDonationConfirmer;
pub use pending_donation_store::PendingDonationStore;
pub use simulated_gateway::SimulatedGateway;

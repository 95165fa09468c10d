//! Domain layer - Core checkout rules and models
//!
//! This module contains the payment method model, input formatting,
//! validation rules and the ports to external collaborators. Nothing here
//! depends on timers, locks or HTTP.

pub mod donation;
pub mod formatting;
pub mod payment_method;
pub mod payments;
pub mod validation;

pub use donation::{DonationKind, DonationLimits, PendingDonation};
pub use formatting::{detect_card_brand, format_card_number, format_expiry, CardBrand};
pub use payment_method::{MethodTag, PaymentField, PaymentMethod, UpiSubMode};
pub use payments::{
    ChargeRequest, DonationConfirmation, DonationConfirmer, GatewayError, GatewayReceipt,
    PaymentGateway, PaymentReceipt,
};
pub use validation::{validate, ValidationField, ValidationReason, ValidationResult};

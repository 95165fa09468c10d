//! Payment method variants offered on the checkout page

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::formatting::{self, CardBrand};

/// Tag of the mutually exclusive payment paths
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MethodTag {
    Upi,
    Card,
    NetBanking,
    Qr,
}

impl MethodTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodTag::Upi => "upi",
            MethodTag::Card => "card",
            MethodTag::NetBanking => "netbanking",
            MethodTag::Qr => "qr",
        }
    }

    /// Name shown on the pay button
    pub fn display_name(&self) -> &'static str {
        match self {
            MethodTag::Upi => "UPI",
            MethodTag::Card => "Card",
            MethodTag::NetBanking => "Net Banking",
            MethodTag::Qr => "QR",
        }
    }
}

impl fmt::Display for MethodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MethodTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upi" => Ok(MethodTag::Upi),
            "card" | "cards" => Ok(MethodTag::Card),
            "netbanking" | "net-banking" => Ok(MethodTag::NetBanking),
            "qr" => Ok(MethodTag::Qr),
            _ => Err(format!("unsupported payment method: {}", s)),
        }
    }
}

/// How a UPI payment is completed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpiSubMode {
    /// Scan a code from the UPI app
    Qr,
    /// Hand off to an installed UPI app
    Intent,
    /// Collect request to a typed virtual payment address
    Vpa,
}

impl std::str::FromStr for UpiSubMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qr" | "upi-qr" => Ok(UpiSubMode::Qr),
            "intent" | "upi-app" => Ok(UpiSubMode::Intent),
            "vpa" | "upi-id" => Ok(UpiSubMode::Vpa),
            _ => Err(format!("unsupported UPI mode: {}", s)),
        }
    }
}

/// User-editable fields across all methods
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentField {
    VpaId,
    CardNumber,
    Expiry,
    Cvv,
    HolderName,
}

impl PaymentField {
    /// Method the field belongs to
    pub fn method(&self) -> MethodTag {
        match self {
            PaymentField::VpaId => MethodTag::Upi,
            PaymentField::CardNumber
            | PaymentField::Expiry
            | PaymentField::Cvv
            | PaymentField::HolderName => MethodTag::Card,
        }
    }
}

impl std::str::FromStr for PaymentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vpa_id" | "upi-id-field" => Ok(PaymentField::VpaId),
            "card_number" | "card-number" => Ok(PaymentField::CardNumber),
            "expiry" => Ok(PaymentField::Expiry),
            "cvv" => Ok(PaymentField::Cvv),
            "holder_name" | "cardholder-name" => Ok(PaymentField::HolderName),
            _ => Err(format!("unknown payment field: {}", s)),
        }
    }
}

/// The active payment method and its entered details
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi {
        sub_mode: UpiSubMode,
        vpa_id: Option<String>,
    },
    Card {
        number: String,
        expiry: String,
        cvv: String,
        holder_name: String,
    },
    NetBanking {
        bank_code: Option<String>,
    },
    Qr {
        expires_at: DateTime<Utc>,
    },
}

impl PaymentMethod {
    /// Freshly defaulted instance of a method
    pub fn default_for(tag: MethodTag, qr_ttl_seconds: u32) -> Self {
        match tag {
            MethodTag::Upi => PaymentMethod::Upi {
                sub_mode: UpiSubMode::Intent,
                vpa_id: None,
            },
            MethodTag::Card => PaymentMethod::Card {
                number: String::new(),
                expiry: String::new(),
                cvv: String::new(),
                holder_name: String::new(),
            },
            MethodTag::NetBanking => PaymentMethod::NetBanking { bank_code: None },
            MethodTag::Qr => PaymentMethod::Qr {
                expires_at: Utc::now() + Duration::seconds(i64::from(qr_ttl_seconds)),
            },
        }
    }

    pub fn tag(&self) -> MethodTag {
        match self {
            PaymentMethod::Upi { .. } => MethodTag::Upi,
            PaymentMethod::Card { .. } => MethodTag::Card,
            PaymentMethod::NetBanking { .. } => MethodTag::NetBanking,
            PaymentMethod::Qr { .. } => MethodTag::Qr,
        }
    }

    /// Brand of the entered card, if this is a card payment
    pub fn card_brand(&self) -> Option<CardBrand> {
        match self {
            PaymentMethod::Card { number, .. } => {
                formatting::detect_card_brand(&formatting::digits_only(number))
            }
            _ => None,
        }
    }
}

// Card details never reach logs in clear.
impl fmt::Debug for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Upi { sub_mode, vpa_id } => f
                .debug_struct("Upi")
                .field("sub_mode", sub_mode)
                .field("vpa_id", vpa_id)
                .finish(),
            PaymentMethod::Card { number, expiry, holder_name, .. } => {
                let digits = formatting::digits_only(number);
                let last4 = &digits[digits.len().saturating_sub(4)..];
                f.debug_struct("Card")
                    .field("number", &format!("**** {}", last4))
                    .field("expiry", expiry)
                    .field("cvv", &"***")
                    .field("holder_name", holder_name)
                    .finish()
            }
            PaymentMethod::NetBanking { bank_code } => f
                .debug_struct("NetBanking")
                .field("bank_code", bank_code)
                .finish(),
            PaymentMethod::Qr { expires_at } => f
                .debug_struct("Qr")
                .field("expires_at", expires_at)
                .finish(),
        }
    }
}

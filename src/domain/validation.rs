//! Payment detail validation - field rules for each payment method
//!
//! Validation is pure and synchronous. A failure is a value, not an error:
//! callers turn `ValidationResult::Invalid` into a field-level message and
//! never contact the gateway.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::error;

use crate::domain::formatting::digits_only;
use crate::domain::payment_method::{PaymentMethod, UpiSubMode};
use crate::shared::error::{AppError, AppResult};

const VPA_PATTERN: &str = r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+$";
const CARD_DIGITS_MIN: usize = 13;
const CARD_DIGITS_MAX: usize = 19;
const CVV_MIN_LEN: usize = 3;

/// Field a validation failure points at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationField {
    VpaId,
    CardNumber,
    Expiry,
    Cvv,
    HolderName,
    Bank,
}

impl ValidationField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationField::VpaId => "vpa_id",
            ValidationField::CardNumber => "card_number",
            ValidationField::Expiry => "expiry",
            ValidationField::Cvv => "cvv",
            ValidationField::HolderName => "holder_name",
            ValidationField::Bank => "bank",
        }
    }
}

impl fmt::Display for ValidationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field was rejected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationReason {
    Required,
    Malformed,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::Required => f.write_str("REQUIRED"),
            ValidationReason::Malformed => f.write_str("MALFORMED"),
        }
    }
}

/// Outcome of validating the active method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    Ok,
    Invalid {
        field: ValidationField,
        reason: ValidationReason,
    },
}

impl ValidationResult {
    fn invalid(field: ValidationField, reason: ValidationReason) -> Self {
        ValidationResult::Invalid { field, reason }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok)
    }

    /// Message shown next to the offending field
    pub fn user_message(&self) -> Option<&'static str> {
        let ValidationResult::Invalid { field, .. } = self else {
            return None;
        };
        Some(match field {
            ValidationField::VpaId => "Please enter a valid UPI ID",
            ValidationField::CardNumber => "Please enter a valid card number",
            ValidationField::Expiry => "Please enter a valid expiry date",
            ValidationField::Cvv => "Please enter a valid CVV",
            ValidationField::HolderName => "Please enter cardholder name",
            ValidationField::Bank => "Please select your bank",
        })
    }

    pub fn into_result(self) -> AppResult<()> {
        match self {
            ValidationResult::Ok => Ok(()),
            ValidationResult::Invalid { field, reason } => {
                Err(AppError::Validation(format!("{}: {}", field, reason)))
            }
        }
    }
}

fn vpa_regex() -> Option<&'static Regex> {
    static VPA: OnceLock<Option<Regex>> = OnceLock::new();
    VPA.get_or_init(|| match Regex::new(VPA_PATTERN) {
        Ok(regex) => Some(regex),
        Err(e) => {
            error!(pattern = VPA_PATTERN, error = %e, "Invalid UPI ID pattern; every UPI ID will be rejected");
            None
        }
    })
    .as_ref()
}

/// Validate the fields required by a payment method
pub fn validate(method: &PaymentMethod) -> ValidationResult {
    match method {
        PaymentMethod::Upi { sub_mode, vpa_id } => match sub_mode {
            UpiSubMode::Vpa => validate_vpa(vpa_id.as_deref()),
            UpiSubMode::Qr | UpiSubMode::Intent => ValidationResult::Ok,
        },
        PaymentMethod::Card { number, expiry, cvv, holder_name } => {
            validate_card(number, expiry, cvv, holder_name)
        }
        PaymentMethod::NetBanking { bank_code } => match bank_code.as_deref() {
            Some(code) if !code.trim().is_empty() => ValidationResult::Ok,
            _ => ValidationResult::invalid(ValidationField::Bank, ValidationReason::Required),
        },
        // Paid from outside the form
        PaymentMethod::Qr { .. } => ValidationResult::Ok,
    }
}

/// `localpart@handle`, one `@`, no whitespace
pub fn validate_vpa(vpa_id: Option<&str>) -> ValidationResult {
    let Some(vpa) = vpa_id.filter(|v| !v.is_empty()) else {
        return ValidationResult::invalid(ValidationField::VpaId, ValidationReason::Required);
    };
    match vpa_regex() {
        Some(re) if re.is_match(vpa) => ValidationResult::Ok,
        _ => ValidationResult::invalid(ValidationField::VpaId, ValidationReason::Malformed),
    }
}

/// Card rules in display order; the first failing field is reported
pub fn validate_card(number: &str, expiry: &str, cvv: &str, holder_name: &str) -> ValidationResult {
    let digits = digits_only(number);
    if digits.is_empty() {
        return ValidationResult::invalid(ValidationField::CardNumber, ValidationReason::Required);
    }
    if !(CARD_DIGITS_MIN..=CARD_DIGITS_MAX).contains(&digits.len()) {
        return ValidationResult::invalid(ValidationField::CardNumber, ValidationReason::Malformed);
    }

    if expiry.is_empty() {
        return ValidationResult::invalid(ValidationField::Expiry, ValidationReason::Required);
    }
    if !is_mm_yy(expiry) {
        return ValidationResult::invalid(ValidationField::Expiry, ValidationReason::Malformed);
    }

    if cvv.is_empty() {
        return ValidationResult::invalid(ValidationField::Cvv, ValidationReason::Required);
    }
    if cvv.chars().count() < CVV_MIN_LEN {
        return ValidationResult::invalid(ValidationField::Cvv, ValidationReason::Malformed);
    }

    if holder_name.trim().is_empty() {
        return ValidationResult::invalid(ValidationField::HolderName, ValidationReason::Required);
    }

    ValidationResult::Ok
}

/// Shape only: two digits, a slash, two digits. Month range is not checked.
fn is_mm_yy(expiry: &str) -> bool {
    let bytes = expiry.as_bytes();
    bytes.len() == 5
        && bytes[2] == b'/'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit())
}

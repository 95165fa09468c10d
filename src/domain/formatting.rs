//! Keystroke normalization for card fields

use serde::{Deserialize, Serialize};

/// Card networks recognised from the number prefix
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    RuPay,
    Amex,
}

impl CardBrand {
    pub fn display_name(&self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::RuPay => "RuPay",
            CardBrand::Amex => "American Express",
        }
    }
}

/// Keep only ASCII digits
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Group card digits in blocks of four: `"4111111111111111"` -> `"4111 1111 1111 1111"`.
///
/// Length is not capped here; the validator enforces bounds.
pub fn format_card_number(raw: &str) -> String {
    let digits = digits_only(raw);
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 4);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(c);
    }
    formatted
}

/// Normalize expiry input to `MM/YY`, inserting the slash once two digits are present
pub fn format_expiry(raw: &str) -> String {
    let digits: String = digits_only(raw).chars().take(4).collect();
    if digits.len() >= 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

pub fn detect_card_brand(digits: &str) -> Option<CardBrand> {
    if digits.starts_with('4') {
        return Some(CardBrand::Visa);
    }
    let prefix: u8 = digits.get(..2)?.parse().ok()?;
    match prefix {
        51..=55 => Some(CardBrand::Mastercard),
        60 | 65 => Some(CardBrand::RuPay),
        34 | 37 => Some(CardBrand::Amex),
        _ => None,
    }
}

//! Price extraction from free-form element text.
//!
//! The parser is deliberately blunt: it strips ASCII letters, the common
//! currency symbols and commas, then takes the first `digits(.digits)?` run.
//! Comma decimal separators ("1.234,56") therefore produce a wrong number
//! instead of no match.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DetectionError;

/// Smallest amount accepted as a price.
pub const MIN_PRICE: f64 = 0.01;
/// Largest amount accepted as a price.
pub const MAX_PRICE: f64 = 1_000_000.0;

static STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z$€£¥₹₽฿,]").expect("strip pattern is valid")
});

static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("amount pattern is valid"));

/// Parse `text` into an amount, explaining why it was rejected.
pub fn try_parse_price(text: &str) -> Result<f64, DetectionError> {
    let cleaned = STRIP.replace_all(text, "");
    let digits = AMOUNT
        .find(cleaned.trim())
        .ok_or(DetectionError::NoDigits)?;

    let price: f64 = digits
        .as_str()
        .parse()
        .map_err(|_| DetectionError::NoDigits)?;

    if (MIN_PRICE..=MAX_PRICE).contains(&price) {
        Ok(price)
    } else {
        Err(DetectionError::PriceOutOfRange(price))
    }
}

/// Parse `text` into an amount in `[0.01, 1_000_000]`, or `None`.
pub fn parse_price(text: &str) -> Option<f64> {
    try_parse_price(text).ok()
}

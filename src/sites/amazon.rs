//! Amazon cart total detection

use super::owned;
use crate::traits::OverrideConfig;

const HOSTNAMES: &[&str] = &[
    "amazon.com",
    "amazon.co.uk",
    "amazon.ca",
    "amazon.de",
    "amazon.fr",
    "amazon.es",
    "amazon.it",
    "amazon.co.jp",
    "amazon.in",
    "amazon.com.au",
];

const SELECTORS: &[&str] = &[
    "#sc-subtotal-amount-activecart",
    "#sc-subtotal-amount-buybox",
    ".sc-price-sign + .sc-price",
    r#"[data-name="Active Cart Subtotal"] .sc-price"#,
    ".sc-subtotal-activecart .sc-price",
    "#subtotals-marketplace-table .sc-price",
    "#sc-buy-box-ptc-button ~ .sc-price",
];

pub fn config() -> OverrideConfig {
    OverrideConfig {
        name: "amazon-override".to_string(),
        hostnames: owned(HOSTNAMES),
        selectors: owned(SELECTORS),
    }
}

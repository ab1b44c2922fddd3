//! Shein cart total detection

use super::owned;
use crate::traits::OverrideConfig;

const HOSTNAMES: &[&str] = &[
    "shein.com",
    "us.shein.com",
    "uk.shein.com",
    "m.shein.com",
    "shein.co.uk",
];

const SELECTORS: &[&str] = &[
    ".summary-total .total-price",
    ".cart-summary__total-value",
    r#"[class*="totalPrice"]"#,
    ".checkout-summary .price-total",
    ".j-cart-total",
    ".cart-drawer__total-price",
    r#"[class*="CartTotal"]"#,
    ".bag-total .price",
    r#"[data-testid="cart-total"]"#,
];

pub fn config() -> OverrideConfig {
    OverrideConfig {
        name: "shein-override".to_string(),
        hostnames: owned(HOSTNAMES),
        selectors: owned(SELECTORS),
    }
}

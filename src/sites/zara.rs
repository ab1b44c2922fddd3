//! Zara cart total detection

use super::owned;
use crate::traits::OverrideConfig;

const SELECTORS: &[&str] = &[
    ".shop-cart-summary__total-price",
    r#"[data-qa="shopping-bag-total"]"#,
    ".cart-summary .total-price",
    r#"[class*="cartTotal"]"#,
    ".bag-total-price",
    ".shop-cart-item__price--total",
    r#"[class*="TotalPrice"]"#,
    ".order-summary__total .price",
    r#"[data-testid="cart-total"]"#,
];

pub fn config() -> OverrideConfig {
    OverrideConfig {
        name: "zara-override".to_string(),
        hostnames: owned(&["zara.com"]),
        selectors: owned(SELECTORS),
    }
}

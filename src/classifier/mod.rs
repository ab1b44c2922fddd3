//! Decides whether a page is a shopping cart or checkout page.
//!
//! Signals are checked in order and the first hit wins: the URL, the page
//! title, then any `application/ld+json` block typed as a checkout or cart.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::error::DetectionError;

pub const CART_URL_PATTERNS: &[&str] = &[
    "/cart",
    "/basket",
    "/bag",
    "/shopping-bag",
    "/shopping-cart",
    "/checkout",
    "/viewcart",
    "/shoppingcart",
    "/mycart",
    "/your-cart",
];

pub const CART_TITLE_WORDS: &[&str] = &["cart", "basket", "bag", "checkout"];

pub const CART_SCHEMA_TYPES: &[&str] = &["CheckoutPage", "ShoppingCart"];

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));

static LD_JSON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector is valid")
});

/// Classify from already extracted page state.
pub fn is_cart_page<S: AsRef<str>>(url: &str, title: &str, structured_data: &[S]) -> bool {
    if url_matches(url) {
        debug!("Cart page by URL: {}", url);
        return true;
    }

    let title = title.to_lowercase();
    if CART_TITLE_WORDS.iter().any(|word| title.contains(word)) {
        debug!("Cart page by title: {}", title);
        return true;
    }

    structured_data.iter().any(|block| match schema_type(block.as_ref()) {
        Ok(Some(kind)) => CART_SCHEMA_TYPES.contains(&kind.as_str()),
        Ok(None) => false,
        Err(e) => {
            debug!("Ignoring structured data block: {}", e);
            false
        }
    })
}

/// Classify a parsed document, pulling its title and structured data.
pub fn classify_document(url: &str, document: &Html) -> bool {
    let title = page_title(document).unwrap_or_default();
    let blocks: Vec<String> = document
        .select(&LD_JSON)
        .map(|script| script.text().collect())
        .collect();

    is_cart_page(url, &title, &blocks)
}

pub fn page_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn url_matches(url: &str) -> bool {
    let full = url.to_lowercase();
    let path = url::Url::parse(url)
        .map(|parsed| parsed.path().to_lowercase())
        .unwrap_or_default();

    CART_URL_PATTERNS
        .iter()
        .any(|pattern| path.contains(pattern) || full.contains(pattern))
}

/// `@type` of a top-level JSON object, if it has a string one.
fn schema_type(block: &str) -> Result<Option<String>, DetectionError> {
    let value: Value = serde_json::from_str(block)?;
    Ok(value
        .get("@type")
        .and_then(Value::as_str)
        .map(str::to_string))
}

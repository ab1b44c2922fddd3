//! Ordered CSS selector catalog for locating cart totals.
//!
//! Order is precedence: data attributes, then ids, then classes, then
//! semantic selectors. A scan walks the catalog strictly in that order and
//! the first element whose text parses to a valid price wins, no matter
//! where it sits in the document.

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::error::DetectionError;
use crate::models::{DetectionResult, Provenance};
use crate::price::parse_price;

/// Generic total selectors, most specific first
pub const TOTAL_SELECTORS: &[&str] = &[
    // Data attributes
    r#"[data-testid*="total" i]"#,
    r#"[data-qa*="total" i]"#,
    r#"[data-test*="total" i]"#,
    r#"[data-automation*="total" i]"#,
    // Ids
    r#"[id*="cart"][id*="total" i]"#,
    r#"[id*="order"][id*="total" i]"#,
    r#"[id*="subtotal" i]"#,
    r#"[id*="grand-total" i]"#,
    r#"[id*="cart-total" i]"#,
    r#"[id*="checkout-total" i]"#,
    // Classes
    r#"[class*="cart-total" i]"#,
    r#"[class*="order-total" i]"#,
    r#"[class*="grand-total" i]"#,
    r#"[class*="subtotal" i]"#,
    r#"[class*="summary-total" i]"#,
    r#"[class*="checkout-total" i]"#,
    r#"[class*="bag-total" i]"#,
    r#"[class*="basket-total" i]"#,
    // Semantic
    ".cart-summary .total",
    ".order-summary .total",
    ".cart-totals .amount",
    ".summary-row.total",
    ".price-total",
    ".total-price",
];

/// One catalog entry; `selector` is `None` when the pattern failed to compile.
#[derive(Debug, Clone)]
struct CatalogEntry {
    pattern: String,
    selector: Option<Selector>,
}

/// Compile `pattern`, mapping the parser error into a typed skip reason.
pub fn compile(pattern: &str) -> Result<Selector, DetectionError> {
    Selector::parse(pattern)
        .map_err(|e| DetectionError::invalid_selector(pattern, format!("{e:?}")))
}

#[derive(Debug, Clone)]
pub struct SelectorCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for SelectorCatalog {
    fn default() -> Self {
        Self::new(TOTAL_SELECTORS.iter().copied())
    }
}

impl SelectorCatalog {
    /// Build a catalog from patterns in precedence order.
    ///
    /// Patterns the selector engine rejects stay in the list but are skipped
    /// by every scan.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.into();
                let selector = match compile(&pattern) {
                    Ok(selector) => Some(selector),
                    Err(e) => {
                        warn!("Skipping catalog entry: {}", e);
                        None
                    }
                };
                CatalogEntry { pattern, selector }
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scan the catalog in order and return the first valid price.
    pub fn find<'doc>(&self, document: &'doc Html) -> Option<DetectionResult<'doc>> {
        for entry in &self.entries {
            let Some(selector) = &entry.selector else {
                debug!("Selector `{}` unsupported, skipping", entry.pattern);
                continue;
            };

            if let Some((element, price)) = first_priced(document, selector) {
                return Some(DetectionResult {
                    element,
                    price,
                    provenance: Provenance::Selector(entry.pattern.clone()),
                });
            }
        }

        None
    }
}

/// First element matched by `selector`, in document order, whose text parses
/// to a valid price.
pub(crate) fn first_priced<'doc>(
    document: &'doc Html,
    selector: &Selector,
) -> Option<(scraper::ElementRef<'doc>, f64)> {
    document.select(selector).find_map(|element| {
        let text = element.text().collect::<String>();
        parse_price(&text)
            .filter(|price| *price > 0.0)
            .map(|price| (element, price))
    })
}

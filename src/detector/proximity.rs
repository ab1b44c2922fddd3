//! Keyword-proximity fallback for markup no selector knows about.
//!
//! Every text node mentioning a total keyword anchors a search in its
//! nearest block or row container, and the largest price found across all
//! anchors wins.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::models::{DetectionResult, Provenance};
use crate::price::parse_price;

pub const TOTAL_KEYWORDS: &[&str] = &[
    "total",
    "subtotal",
    "grand total",
    "order total",
    "cart total",
];

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));

static CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, li, tr, p").expect("container selector is valid"));

static PRICE_SHAPED: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"span, div, strong, b, [class*="price"], [class*="amount"]"#)
        .expect("price selector is valid")
});

/// Elements whose text is never page copy
const SKIPPED_PARENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Largest price near a total keyword, or `None`.
pub fn find_by_text_proximity(document: &Html) -> Option<DetectionResult<'_>> {
    let body = document.select(&BODY).next()?;
    let mut best: Option<(ElementRef<'_>, f64)> = None;

    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let normalized = text.trim().to_lowercase();
        if !TOTAL_KEYWORDS.iter().any(|keyword| normalized.contains(keyword)) {
            continue;
        }

        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if SKIPPED_PARENTS.contains(&parent.value().name()) {
            continue;
        }

        let container = nearest_container(parent);
        for candidate in container.select(&PRICE_SHAPED) {
            let Some(price) = parse_price(&candidate.text().collect::<String>()) else {
                continue;
            };

            if best.is_none_or(|(_, top)| price > top) {
                best = Some((candidate, price));
            }
        }
    }

    let (element, price) = best?;
    debug!("Text proximity picked {}", price);
    Some(DetectionResult {
        element,
        price,
        provenance: Provenance::TextProximity,
    })
}

/// `element` itself or its closest block/row ancestor, else `element`.
fn nearest_container(element: ElementRef<'_>) -> ElementRef<'_> {
    let mut current = Some(element);
    while let Some(candidate) = current {
        if CONTAINER.matches(&candidate) {
            return candidate;
        }
        current = candidate.parent().and_then(ElementRef::wrap);
    }
    element
}

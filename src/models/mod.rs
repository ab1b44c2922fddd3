//! Data models for detection results, page snapshots and tracked cart views

use std::fmt;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

/// Where a detected total came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// A generic catalog selector matched
    Selector(String),
    /// The keyword-proximity fallback found it
    TextProximity,
    /// A registered site override found it
    SiteOverride(String),
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(pattern) => f.write_str(pattern),
            Self::TextProximity => f.write_str("text-proximity"),
            Self::SiteOverride(name) => f.write_str(name),
        }
    }
}

/// A cart total found in a document.
///
/// The element borrows the document it was found in; results are recomputed
/// on every detection call and never outlive the page snapshot.
#[derive(Debug, Clone)]
pub struct DetectionResult<'doc> {
    pub element: ElementRef<'doc>,
    pub price: f64,
    pub provenance: Provenance,
}

impl DetectionResult<'_> {
    /// Trimmed text content of the matched element
    pub fn text(&self) -> String {
        element_text(&self.element)
    }
}

pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Page state captured at one instant
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Hostname used for override lookup and tracking
    pub fn site_name(&self) -> Option<String> {
        site_name(&self.url)
    }
}

/// Hostname of `url` without a leading `www.`.
pub fn site_name(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();

    Some(match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    })
}

/// A single cart sighting handed to the tracking layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub site: String,
    pub value: f64,
    pub hours: f64,
    pub timestamp: DateTime<Utc>,
}

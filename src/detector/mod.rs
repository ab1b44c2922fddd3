//! Cart total detection pipeline: site override, then the selector catalog,
//! then keyword proximity.

mod proximity;

pub use proximity::{TOTAL_KEYWORDS, find_by_text_proximity};

use std::str::FromStr;

use scraper::Html;
use tracing::debug;

use crate::models::DetectionResult;
use crate::selectors::SelectorCatalog;
use crate::sites::SiteOverrideRegistry;

/// What happens when a registered override finds nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverridePolicy {
    /// The override's answer is final, `None` included
    #[default]
    Exclusive,
    /// A `None` from the override continues into the generic pipeline
    FallThrough,
}

impl FromStr for OverridePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exclusive" => Ok(Self::Exclusive),
            "fallthrough" | "fall-through" => Ok(Self::FallThrough),
            other => Err(anyhow::anyhow!("unknown override policy: {other}")),
        }
    }
}

/// Stateless between calls; safe to call as often as the page changes.
#[derive(Debug, Clone)]
pub struct TotalDetector {
    catalog: SelectorCatalog,
    overrides: SiteOverrideRegistry,
    policy: OverridePolicy,
}

impl Default for TotalDetector {
    fn default() -> Self {
        Self::new(SiteOverrideRegistry::with_builtin())
    }
}

impl TotalDetector {
    pub fn new(overrides: SiteOverrideRegistry) -> Self {
        Self {
            catalog: SelectorCatalog::default(),
            overrides,
            policy: OverridePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: SelectorCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: OverridePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OverridePolicy {
        self.policy
    }

    /// Generic selector scan only
    pub fn find_by_selectors<'doc>(&self, document: &'doc Html) -> Option<DetectionResult<'doc>> {
        self.catalog.find(document)
    }

    /// Run the full pipeline for `hostname` against `document`.
    pub fn detect_cart_total<'doc>(
        &self,
        hostname: &str,
        document: &'doc Html,
    ) -> Option<DetectionResult<'doc>> {
        if let Some(site) = self.overrides.get(hostname) {
            let result = site.detect(document);
            if result.is_some() || self.policy == OverridePolicy::Exclusive {
                debug!(
                    "{} for {}: {:?}",
                    site.name(),
                    hostname,
                    result.as_ref().map(|r| r.price)
                );
                return result;
            }
        }

        if let Some(result) = self.find_by_selectors(document) {
            debug!("Found total via selector: {} {}", result.provenance, result.price);
            return Some(result);
        }

        if let Some(result) = find_by_text_proximity(document) {
            debug!("Found total via text proximity: {}", result.price);
            return Some(result);
        }

        debug!("No cart total found on {}", hostname);
        None
    }
}

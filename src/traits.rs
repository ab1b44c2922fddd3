//! Traits and interfaces for site-agnostic cart detection

use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;

use crate::models::{DetectionResult, PageSnapshot};

/// Configuration for a selector-driven site override
#[derive(Debug, Clone)]
pub struct OverrideConfig {
    /// Name reported as the result provenance, e.g. `amazon-override`
    pub name: String,
    /// Hostnames this override is registered under, one per locale domain
    pub hostnames: Vec<String>,
    /// Total selectors in the order they are tried
    pub selectors: Vec<String>,
}

/// Site-specific detection strategy consulted before the generic pipeline
pub trait SiteOverride: Send + Sync {
    /// Name reported as the result provenance
    fn name(&self) -> &str;

    /// Look for the cart total in `document`
    ///
    /// # Returns
    /// * `Option<DetectionResult>` - The total, or `None` when the site's own
    ///   markup did not yield one
    fn detect<'doc>(&self, document: &'doc Html) -> Option<DetectionResult<'doc>>;
}

/// Anything that can hand out the current state of a page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Capture the page as it is right now
    async fn snapshot(&self) -> Result<PageSnapshot>;
}

//! Site override registry and the built-in per-site scrapers

pub mod amazon;
pub mod shein;
pub mod zara;

use std::collections::HashMap;
use std::sync::Arc;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::models::{DetectionResult, Provenance};
use crate::selectors::{compile, first_priced};
use crate::traits::{OverrideConfig, SiteOverride};

/// Override that tries a fixed list of selectors in order
pub struct SelectorOverride {
    config: OverrideConfig,
    compiled: Vec<(String, Option<Selector>)>,
}

impl SelectorOverride {
    pub fn new(config: OverrideConfig) -> Self {
        let compiled = config
            .selectors
            .iter()
            .map(|pattern| {
                let selector = compile(pattern)
                    .map_err(|e| warn!("{}: {}", config.name, e))
                    .ok();
                (pattern.clone(), selector)
            })
            .collect();

        Self { config, compiled }
    }
}

impl SiteOverride for SelectorOverride {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn detect<'doc>(&self, document: &'doc Html) -> Option<DetectionResult<'doc>> {
        for (pattern, selector) in &self.compiled {
            let Some(selector) = selector else {
                continue;
            };

            if let Some((element, price)) = first_priced(document, selector) {
                debug!("{} matched `{}` -> {}", self.config.name, pattern, price);
                return Some(DetectionResult {
                    element,
                    price,
                    provenance: Provenance::SiteOverride(self.config.name.clone()),
                });
            }
        }

        None
    }
}

/// Override backed by a function, for markup a selector list can't describe
pub struct FnOverride<F> {
    name: String,
    detect: F,
}

impl<F> FnOverride<F> {
    pub fn new(name: impl Into<String>, detect: F) -> Self
    where
        F: for<'d> Fn(&'d Html) -> Option<DetectionResult<'d>> + Send + Sync,
    {
        Self {
            name: name.into(),
            detect,
        }
    }
}

impl<F> SiteOverride for FnOverride<F>
where
    F: for<'d> Fn(&'d Html) -> Option<DetectionResult<'d>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn detect<'doc>(&self, document: &'doc Html) -> Option<DetectionResult<'doc>> {
        (self.detect)(document)
    }
}

/// Hostname to override mapping, built once at startup.
///
/// Lookups use the exact hostname string; every locale domain has to be
/// registered on its own.
#[derive(Clone, Default)]
pub struct SiteOverrideRegistry {
    overrides: HashMap<String, Arc<dyn SiteOverride>>,
}

impl SiteOverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Amazon, Shein and Zara overrides
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for config in [amazon::config(), shein::config(), zara::config()] {
            registry.register_config(config);
        }
        registry
    }

    /// Register `detector` for `hostname`, replacing any previous entry.
    pub fn register(&mut self, hostname: impl Into<String>, detector: Arc<dyn SiteOverride>) {
        let hostname = hostname.into();
        debug!("Registering {} for {}", detector.name(), hostname);
        self.overrides.insert(hostname, detector);
    }

    /// Register `detect` for `hostname` under `name`.
    pub fn register_fn<F>(
        &mut self,
        hostname: impl Into<String>,
        name: impl Into<String>,
        detect: F,
    ) where
        F: for<'d> Fn(&'d Html) -> Option<DetectionResult<'d>> + Send + Sync + 'static,
    {
        self.register(hostname, Arc::new(FnOverride::new(name, detect)));
    }

    /// Register a selector override under every hostname in its config.
    pub fn register_config(&mut self, config: OverrideConfig) {
        let hostnames = config.hostnames.clone();
        let detector: Arc<dyn SiteOverride> = Arc::new(SelectorOverride::new(config));

        for hostname in hostnames {
            self.register(hostname, Arc::clone(&detector));
        }
        info!("{} override registered", detector.name());
    }

    pub fn get(&self, hostname: &str) -> Option<&Arc<dyn SiteOverride>> {
        self.overrides.get(hostname)
    }

    pub fn contains(&self, hostname: &str) -> bool {
        self.overrides.contains_key(hostname)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl std::fmt::Debug for SiteOverrideRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut hosts: Vec<_> = self.overrides.keys().collect();
        hosts.sort();
        f.debug_struct("SiteOverrideRegistry")
            .field("hostnames", &hosts)
            .finish()
    }
}

pub(crate) fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

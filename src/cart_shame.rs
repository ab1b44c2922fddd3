use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::classifier::classify_document;
use crate::config::Settings;
use crate::detector::TotalDetector;
use crate::models::{CartView, PageSnapshot};
use crate::sites::SiteOverrideRegistry;
use crate::tracking::{CartLedger, hours_of_work, shame_message};
use crate::traits::PageSource;
use crate::watcher::{ChangeWatcher, MutationReceiver, WatchHandle};

/// What a single look at a page found
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartReport {
    pub site: String,
    pub is_cart_page: bool,
    pub total: Option<f64>,
    pub provenance: Option<String>,
    pub hours: Option<f64>,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct CartShame {
    detector: Arc<TotalDetector>,
    settings: Settings,
    ledger: Arc<Mutex<CartLedger>>,
}

impl CartShame {
    pub fn new(settings: Settings) -> Self {
        let detector = TotalDetector::new(SiteOverrideRegistry::with_builtin())
            .with_policy(settings.override_policy);

        Self {
            detector: Arc::new(detector),
            ledger: Arc::new(Mutex::new(CartLedger::new(settings.site_debounce))),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Classify `page` and, when it is a cart, detect its total.
    pub fn inspect(&self, page: &PageSnapshot) -> CartReport {
        let site = page.site_name().unwrap_or_default();
        let document = page.document();
        let is_cart_page = classify_document(&page.url, &document);

        let mut report = CartReport {
            site,
            is_cart_page,
            total: None,
            provenance: None,
            hours: None,
            message: None,
        };
        if !is_cart_page {
            info!("{} is not a cart page", page.url);
            return report;
        }

        if let Some(result) = self.detector.detect_cart_total(&report.site, &document) {
            let hours = hours_of_work(result.price, self.settings.hourly_rate);
            info!(
                "Cart total on {}: ${:.2} = {:.1} hours @ ${}/hr",
                report.site, result.price, hours, self.settings.hourly_rate
            );
            report.total = Some(result.price);
            report.provenance = Some(result.provenance.to_string());
            report.hours = Some(hours);
            report.message = Some(shame_message(hours, self.settings.role));
        }

        report
    }

    /// Record a sighting of `total` on `site`; `None` when debounced.
    pub fn track(&self, site: &str, total: f64) -> Option<CartView> {
        let view = CartView {
            site: site.to_string(),
            value: total,
            hours: hours_of_work(total, self.settings.hourly_rate),
            timestamp: Utc::now(),
        };

        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        ledger.record(view.clone()).then_some(view)
    }

    pub fn ledger(&self) -> Arc<Mutex<CartLedger>> {
        Arc::clone(&self.ledger)
    }

    /// Keep the total live, passing every debounced change to `on_update`
    /// with its hour figure.
    ///
    /// One page view is one sighting: a total is tracked here only when
    /// `initial` had none, and then only the first one found.
    pub fn watch<F>(
        &self,
        initial: &CartReport,
        source: Arc<dyn PageSource>,
        mutations: MutationReceiver,
        on_update: F,
    ) -> WatchHandle
    where
        F: Fn(f64, f64) + Send + 'static,
    {
        let watcher = ChangeWatcher::new(Arc::clone(&self.detector))
            .with_debounce(self.settings.debounce);
        let app = self.clone();
        let site = initial.site.clone();
        let tracked = AtomicBool::new(initial.total.is_some());

        watcher.watch(source, mutations, move |total| {
            if !tracked.swap(true, Ordering::SeqCst) {
                app.track(&site, total);
            }
            on_update(total, hours_of_work(total, app.settings.hourly_rate));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, body: &str) -> PageSnapshot {
        PageSnapshot::new(
            url,
            format!("<html><head><title>Shop</title></head><body>{body}</body></html>"),
        )
    }

    #[test]
    fn reports_hours_for_a_cart() {
        let app = CartShame::new(Settings::default());
        let report = app.inspect(&page(
            "https://www.example.com/cart",
            r#"<div class="cart-total">$125.00</div>"#,
        ));

        assert_eq!(report.site, "example.com");
        assert!(report.is_cart_page);
        assert_eq!(report.total, Some(125.0));
        assert_eq!(report.hours, Some(2.5));
        assert_eq!(
            report.provenance.as_deref(),
            Some(r#"[class*="cart-total" i]"#)
        );
        assert_eq!(
            report.message.as_deref(),
            Some("This cart costs him 2.5 hours of work!")
        );
    }

    #[test]
    fn skips_detection_off_cart_pages() {
        let app = CartShame::new(Settings::default());
        let report = app.inspect(&page(
            "https://example.com/product/1",
            r#"<div class="cart-total">$125.00</div>"#,
        ));

        assert!(!report.is_cart_page);
        assert_eq!(report.total, None);
    }

    #[test]
    fn tracking_debounces_per_site() {
        let app = CartShame::new(Settings::default());
        assert!(app.track("zara.com", 80.0).is_some());
        assert!(app.track("zara.com", 90.0).is_none());

        let ledger = app.ledger();
        let ledger = ledger.lock().unwrap();
        assert_eq!(ledger.lifetime().sightings, 1);
        assert_eq!(ledger.lifetime().cart_value, 80.0);
    }

    mod live {
        use std::time::Duration;

        use super::*;
        use crate::page::StaticPageSource;
        use crate::watcher::{Mutation, mutation_channel};

        fn no_debounce() -> CartShame {
            CartShame::new(Settings {
                site_debounce: chrono::Duration::zero(),
                ..Settings::default()
            })
        }

        fn cart(total: &str) -> String {
            format!(
                r#"<html><head><title>Cart</title></head>
                   <body><div class="cart-total">{total}</div></body></html>"#
            )
        }

        async fn two_updates(app: &CartShame, initial: &CartReport) -> Vec<f64> {
            let source = Arc::new(StaticPageSource::new(
                "https://shop.test/cart",
                cart("$40.00"),
            ));
            let updates = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&updates);
            let (tx, rx) = mutation_channel();
            let handle = app.watch(initial, source.clone(), rx, move |total, _| {
                sink.lock().unwrap().push(total);
            });

            tx.send(Mutation::ChildList).unwrap();
            tokio::time::sleep(Duration::from_millis(600)).await;
            source.set_html(cart("$60.00"));
            tx.send(Mutation::CharacterData).unwrap();
            tokio::time::sleep(Duration::from_millis(600)).await;

            drop(tx);
            handle.stopped().await.unwrap();
            updates.lock().unwrap().clone()
        }

        #[tokio::test(start_paused = true)]
        async fn updates_after_a_tracked_view_are_not_sightings() {
            let app = no_debounce();
            let page = PageSnapshot::new("https://shop.test/cart", cart("$20.00"));
            let initial = app.inspect(&page);
            assert!(app.track(&initial.site, 20.0).is_some());

            assert_eq!(two_updates(&app, &initial).await, vec![40.0, 60.0]);

            let ledger = app.ledger();
            let ledger = ledger.lock().unwrap();
            assert_eq!(ledger.lifetime().sightings, 1);
            assert_eq!(ledger.lifetime().cart_value, 20.0);
        }

        #[tokio::test(start_paused = true)]
        async fn first_total_found_while_watching_counts_once() {
            let app = no_debounce();
            let initial = app.inspect(&PageSnapshot::new(
                "https://shop.test/cart",
                "<html><head><title>Cart</title></head><body><p>Loading</p></body></html>",
            ));
            assert_eq!(initial.total, None);

            assert_eq!(two_updates(&app, &initial).await, vec![40.0, 60.0]);

            let ledger = app.ledger();
            let ledger = ledger.lock().unwrap();
            assert_eq!(ledger.lifetime().sightings, 1);
            assert_eq!(ledger.lifetime().sites["shop.test"].total_value, 40.0);
        }
    }
}

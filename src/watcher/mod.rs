//! Live re-detection as the page changes.
//!
//! Mutations arrive on a channel. Each one restarts a quiet-period timer and
//! when the page has been quiet for the whole window the detector runs once
//! against a fresh snapshot. The watcher does not compare against earlier
//! totals; every successful detection is reported.

mod poller;

pub use poller::ContentPoller;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::detector::TotalDetector;
use crate::models::PageSnapshot;
use crate::traits::PageSource;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Kind of change observed under the page body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    ChildList,
    CharacterData,
    Attributes,
}

pub type MutationSender = mpsc::UnboundedSender<Mutation>;
pub type MutationReceiver = mpsc::UnboundedReceiver<Mutation>;

pub fn mutation_channel() -> (MutationSender, MutationReceiver) {
    mpsc::unbounded_channel()
}

enum Quiet {
    Elapsed,
    Closed,
    Cancelled,
}

#[derive(Clone)]
pub struct ChangeWatcher {
    detector: Arc<TotalDetector>,
    debounce: Duration,
}

impl ChangeWatcher {
    pub fn new(detector: Arc<TotalDetector>) -> Self {
        Self {
            detector,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Run the full pipeline against one snapshot
    pub fn detect(&self, page: &PageSnapshot) -> Option<f64> {
        let hostname = page.site_name().unwrap_or_default();
        let document = page.document();
        self.detector
            .detect_cart_total(&hostname, &document)
            .map(|result| result.price)
    }

    /// Snapshot `source` and detect its total
    pub async fn detect_once(&self, source: &dyn PageSource) -> Result<Option<f64>> {
        let page = source.snapshot().await?;
        Ok(self.detect(&page))
    }

    /// Subscribe to `mutations`, calling `on_total_changed` after each
    /// debounced burst that yields a total.
    ///
    /// The watch lasts until the handle is unsubscribed or the channel is
    /// closed. Dropping the handle does not stop it.
    pub fn watch<F>(
        &self,
        source: Arc<dyn PageSource>,
        mut mutations: MutationReceiver,
        on_total_changed: F,
    ) -> WatchHandle
    where
        F: Fn(f64) + Send + 'static,
    {
        let watcher = self.clone();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let task = tokio::spawn(async move {
            info!("Watching for cart changes");
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    mutation = mutations.recv() => {
                        let Some(mutation) = mutation else {
                            break;
                        };
                        debug!("Mutation {:?}, waiting for quiet", mutation);

                        let quiet = watcher.wait_for_quiet(&mut mutations, &token).await;
                        if matches!(quiet, Quiet::Cancelled) {
                            break;
                        }

                        match watcher.detect_once(source.as_ref()).await {
                            Ok(Some(price)) => on_total_changed(price),
                            Ok(None) => debug!("No cart total after change"),
                            Err(e) => warn!("Failed to snapshot page: {:#}", e),
                        }

                        if matches!(quiet, Quiet::Closed) {
                            break;
                        }
                    }
                }
            }
            info!("Stopped watching for cart changes");
        });

        WatchHandle { shutdown, task }
    }

    async fn wait_for_quiet(
        &self,
        mutations: &mut MutationReceiver,
        token: &CancellationToken,
    ) -> Quiet {
        let timer = sleep(self.debounce);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => return Quiet::Cancelled,
                () = &mut timer => return Quiet::Elapsed,
                mutation = mutations.recv() => match mutation {
                    Some(_) => timer.as_mut().reset(Instant::now() + self.debounce),
                    None => {
                        return tokio::select! {
                            biased;
                            () = token.cancelled() => Quiet::Cancelled,
                            () = &mut timer => Quiet::Closed,
                        };
                    }
                },
            }
        }
    }
}

/// Subscription handle returned by [`ChangeWatcher::watch`]
pub struct WatchHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop watching; a pending debounce is discarded.
    pub fn unsubscribe(&self) {
        self.shutdown.cancel();
    }

    /// Wait for the watch task to end
    pub async fn stopped(self) -> Result<()> {
        self.task.await?;
        Ok(())
    }
}

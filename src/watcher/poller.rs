//! Change notification for pages we can only fetch: re-fetch on a cron
//! schedule and report a mutation whenever the body hash moves.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};

use super::{Mutation, MutationSender};
use crate::models::PageSnapshot;
use crate::traits::PageSource;

#[derive(Clone)]
pub struct ContentPoller {
    source: Arc<dyn PageSource>,
    mutations: MutationSender,
    last_digest: Arc<Mutex<Option<md5::Digest>>>,
}

impl ContentPoller {
    pub fn new(source: Arc<dyn PageSource>, mutations: MutationSender) -> Self {
        Self {
            source,
            mutations,
            last_digest: Arc::new(Mutex::new(None)),
        }
    }

    /// Poller whose baseline is `page`, so the first poll already compares.
    pub fn with_baseline(
        source: Arc<dyn PageSource>,
        mutations: MutationSender,
        page: &PageSnapshot,
    ) -> Self {
        let poller = Self::new(source, mutations);
        *poller.last_digest.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(md5::compute(page.html.as_bytes()));
        poller
    }

    /// Fetch once and report whether the page changed since the last poll.
    ///
    /// The first poll only records a baseline.
    pub async fn poll_once(&self) -> Result<bool> {
        let page = self.source.snapshot().await?;
        let digest = md5::compute(page.html.as_bytes());

        let previous = {
            let mut last = self.last_digest.lock().unwrap_or_else(|e| e.into_inner());
            last.replace(digest)
        };

        let changed = previous.is_some_and(|previous| previous != digest);
        if changed {
            debug!("{} changed ({:x})", page.url, digest);
            self.mutations.send(Mutation::ChildList)?;
        }

        Ok(changed)
    }

    /// Start polling on `schedule` (six-field cron, seconds first).
    pub async fn start(self, schedule: &str) -> Result<JobScheduler> {
        let sched = JobScheduler::new().await?;

        let poller = self.clone();
        sched
            .add(Job::new_async(schedule, move |_uuid, _l| {
                let poller = poller.clone();
                Box::pin(async move {
                    if let Err(e) = poller.poll_once().await {
                        error!("Error polling page: {:#}", e);
                    }
                })
            })?)
            .await?;

        info!("Polling started - schedule {}", schedule);
        sched.start().await?;

        Ok(sched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::StaticPageSource;
    use crate::watcher::mutation_channel;

    #[tokio::test]
    async fn emits_only_when_content_changes() {
        let source = Arc::new(StaticPageSource::new("https://shop.test/cart", "<p>$1</p>"));
        let (tx, mut rx) = mutation_channel();
        let poller = ContentPoller::new(source.clone(), tx);

        assert!(!poller.poll_once().await.unwrap());
        assert!(!poller.poll_once().await.unwrap());
        assert!(rx.try_recv().is_err());

        source.set_html("<p>$2</p>");
        assert!(poller.poll_once().await.unwrap());
        assert_eq!(rx.try_recv().unwrap(), Mutation::ChildList);
        assert!(!poller.poll_once().await.unwrap());
    }

    #[tokio::test]
    async fn change_before_first_poll_is_reported() {
        let source = Arc::new(StaticPageSource::new("https://shop.test/cart", "<p>$1</p>"));
        let seen = source.snapshot().await.unwrap();
        let (tx, mut rx) = mutation_channel();
        let poller = ContentPoller::with_baseline(source.clone(), tx, &seen);

        source.set_html("<p>$2</p>");
        assert!(poller.poll_once().await.unwrap());
        assert_eq!(rx.try_recv().unwrap(), Mutation::ChildList);
    }

    #[tokio::test]
    async fn unchanged_baseline_stays_quiet() {
        let source = Arc::new(StaticPageSource::new("https://shop.test/cart", "<p>$1</p>"));
        let seen = source.snapshot().await.unwrap();
        let (tx, mut rx) = mutation_channel();
        let poller = ContentPoller::with_baseline(source, tx, &seen);

        assert!(!poller.poll_once().await.unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_watcher_is_an_error() {
        let source = Arc::new(StaticPageSource::new("https://shop.test/cart", "<p>a</p>"));
        let (tx, rx) = mutation_channel();
        let poller = ContentPoller::new(source.clone(), tx);
        drop(rx);

        poller.poll_once().await.unwrap();
        source.set_html("<p>b</p>");
        assert!(poller.poll_once().await.is_err());
    }
}

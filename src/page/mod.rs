//! Page sources: where snapshots of the watched page come from

use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::models::PageSnapshot;
use crate::traits::PageSource;

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
);

/// Fetches a remote page over HTTP
#[derive(Clone)]
pub struct HttpPageSource {
    client: Client,
    url: String,
}

impl HttpPageSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw body, failing on a non-success status
    pub async fn fetch(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Failed to fetch {}: {}",
                self.url,
                response.status()
            ));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn snapshot(&self) -> Result<PageSnapshot> {
        debug!("Fetching {}", self.url);
        let html = self.fetch().await?;
        Ok(PageSnapshot::new(self.url.clone(), html))
    }
}

/// Reads a saved page from disk, reporting it under `url`
#[derive(Debug, Clone)]
pub struct FilePageSource {
    path: PathBuf,
    url: String,
}

impl FilePageSource {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl PageSource for FilePageSource {
    async fn snapshot(&self) -> Result<PageSnapshot> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(PageSnapshot::new(self.url.clone(), html))
    }
}

/// In-memory page whose markup can be swapped while it is being watched
#[derive(Debug, Default)]
pub struct StaticPageSource {
    page: RwLock<PageSnapshot>,
}

impl StaticPageSource {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            page: RwLock::new(PageSnapshot::new(url, html)),
        }
    }

    /// Replace the page body, keeping the URL
    pub fn set_html(&self, html: impl Into<String>) {
        let mut page = self.page.write().unwrap_or_else(|e| e.into_inner());
        page.html = html.into();
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn snapshot(&self) -> Result<PageSnapshot> {
        let page = self.page.read().unwrap_or_else(|e| e.into_inner());
        Ok(page.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_reflects_updates() {
        let source = StaticPageSource::new("https://shop.test/cart", "<p>one</p>");
        assert_eq!(source.snapshot().await.unwrap().html, "<p>one</p>");

        source.set_html("<p>two</p>");
        let page = source.snapshot().await.unwrap();
        assert_eq!(page.html, "<p>two</p>");
        assert_eq!(page.url, "https://shop.test/cart");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let source = FilePageSource::new("/definitely/not/here.html", "https://shop.test/cart");
        let err = source.snapshot().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}

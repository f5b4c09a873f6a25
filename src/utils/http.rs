// src/utils/http.rs

//! Page fetching.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::FetchConfig;

/// Anything that can turn a URL into page text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetcher backed by `reqwest`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        info!(url, "Starting to scrape");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "Got response");
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("status {status}")));
        }

        response.text().await.map_err(|e| AppError::fetch(url, e))
    }
}

/// Fetcher serving fixed pages, for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "status 404 Not Found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_from_default_config() {
        assert!(create_async_client(&FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_static_fetcher_unknown_url_is_fetch_error() {
        let fetcher = StaticFetcher::new().with_page("https://example.com/a/", "<html></html>");
        assert!(fetcher.fetch("https://example.com/a/").await.is_ok());
        let err = fetcher.fetch("https://example.com/b/").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }
}

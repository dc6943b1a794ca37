// # HTTP Page Source
//
// This crate provides the HTTP fetch collaborator for the watcher.
//
// ## Contract
//
// - One GET per engine tick, no retries (the polling interval is the retry)
// - HTTP 200 with a body is success; every other status is a fetch error
// - Bounded request timeout so a hung request cannot stall later ticks
//
// The reqwest client is owned by the source, which is owned by the engine, so
// the connection pool is released when the engine goes away.

use async_trait::async_trait;
use halkarz_core::traits::PageSource;
use halkarz_core::{Error, Result};
use std::time::Duration;

/// Default HTTP timeout for a page fetch (30 seconds)
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request
const USER_AGENT: &str = concat!("halkarz-watch/", env!("CARGO_PKG_VERSION"));

/// Fetches the listings page over HTTP
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    /// Page URL
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpPageSource {
    /// Create a page source with the default timeout
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a page source with a custom timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::config("Page URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }

    /// The fetched URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self) -> Result<String> {
        tracing::debug!("Fetching {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::fetch(format!("HTTP {}", status.as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read response: {}", e)))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

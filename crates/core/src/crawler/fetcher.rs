//! Page fetching.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::config::CrawlerConfig;

/// A fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested.
    pub url: String,
    /// URL after following redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body (may be empty).
    pub body: String,
}

/// Errors for a single page request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request cancelled")]
    Cancelled,
}

/// Something that can fetch a page by URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`.
    ///
    /// Must return [`FetchError::Cancelled`] as soon as `cancel` fires,
    /// abandoning any request in flight.
    async fn fetch(&self, url: &str, cancel: &CancellationToken)
        -> Result<FetchedPage, FetchError>;
}

/// reqwest-backed fetcher.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            reason: format!("Failed to read response body: {}", e),
        })?;

        debug!(url, final_url = %final_url, bytes = body.len(), "Fetched page");

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        // Dropping the request future aborts the transfer
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.get(url) => result,
        }
    }
}

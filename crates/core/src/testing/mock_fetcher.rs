//! Mock page fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::fixtures;
use crate::crawler::{FetchError, FetchedPage, PageFetcher};

#[derive(Debug, Clone)]
struct MockPage {
    final_url: String,
    body: String,
}

/// Mock implementation of the PageFetcher trait.
///
/// Serves pages from memory:
/// - Unknown URLs answer HTTP 404
/// - Pages can answer empty a fixed number of times before their body
/// - Redirects are simulated through a different `final_url`
/// - Every request is recorded in order for assertions
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, MockPage>>>,
    /// Remaining empty answers per URL.
    empty: Arc<RwLock<HashMap<String, u32>>>,
    requests: Arc<RwLock<Vec<String>>>,
    /// Cancel this token once the given number of requests was served.
    cancel_after: Arc<RwLock<Option<(usize, CancellationToken)>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub async fn add_page(&self, url: &str, body: String) {
        self.add_redirect(url, url, &body).await;
    }

    /// Serve `body` at `url`, reporting `final_url` as the post-redirect address.
    pub async fn add_redirect(&self, url: &str, final_url: &str, body: &str) {
        self.pages.write().await.insert(
            url.to_string(),
            MockPage {
                final_url: final_url.to_string(),
                body: body.to_string(),
            },
        );
    }

    /// Serve a linked run of fixture episodes, each page linking to its
    /// previous and next neighbour inside `episodes`.
    pub async fn add_chain(&self, season: u32, episodes: RangeInclusive<u32>) {
        let (first, last) = (*episodes.start(), *episodes.end());
        for episode in episodes {
            let mut page = fixtures::EpisodePage::new(season, episode);
            if episode > first {
                page = page.link_to(season, episode - 1);
            }
            if episode < last {
                page = page.link_to(season, episode + 1);
            }
            self.add_page(&fixtures::episode_url(season, episode), page.render())
                .await;
        }
    }

    /// Answer the next `times` requests for `url` with an empty body.
    pub async fn fail_empty(&self, url: &str, times: u32) {
        self.empty.write().await.insert(url.to_string(), times);
    }

    /// Cancel `token` right after the `requests`-th request was served.
    pub async fn cancel_after(&self, requests: usize, token: CancellationToken) {
        *self.cancel_after.write().await = Some((requests, token));
    }

    /// All requested URLs, in order.
    pub async fn requested(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self, url: &str) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|requested| *requested == url)
            .count()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let served = {
            let mut requests = self.requests.write().await;
            requests.push(url.to_string());
            requests.len()
        };
        if let Some((after, token)) = self.cancel_after.read().await.as_ref() {
            if served >= *after {
                token.cancel();
            }
        }

        let Some(page) = self.pages.read().await.get(url).cloned() else {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            });
        };

        let body = {
            let mut empty = self.empty.write().await;
            match empty.get_mut(url) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    String::new()
                }
                _ => page.body,
            }
        };

        Ok(FetchedPage {
            url: url.to_string(),
            final_url: page.final_url,
            status: 200,
            body,
        })
    }
}

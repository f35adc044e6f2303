//! Seed resolution: where a crawl run starts.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

use super::config::CrawlerConfig;
use super::fetcher::{FetchError, PageFetcher};
use super::types::{CrawlError, CrawlReport};
use crate::catalog::EpisodeCatalog;

/// Starting URL of a crawl run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// Continue from the catalog's most recent episode.
    Resume(String),
    /// Empty catalog; start from the first episode.
    ColdStart(String),
}

impl Seed {
    pub fn url(&self) -> &str {
        match self {
            Self::Resume(url) | Self::ColdStart(url) => url,
        }
    }
}

/// Picks the seed URL from the catalog, or from the site's home page on a cold start.
pub struct SeedResolver {
    config: CrawlerConfig,
    catalog: Arc<dyn EpisodeCatalog>,
    fetcher: Arc<dyn PageFetcher>,
}

impl SeedResolver {
    pub fn new(
        config: CrawlerConfig,
        catalog: Arc<dyn EpisodeCatalog>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            config,
            catalog,
            fetcher,
        }
    }

    pub async fn resolve(&self, cancel: &CancellationToken) -> Result<Seed, CrawlError> {
        match self.catalog.last() {
            Ok(url) => {
                info!(url = %url, "Resuming crawl from most recent episode");
                Ok(Seed::Resume(url))
            }
            Err(e) if e.is_not_found() => self.cold_start(cancel).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn cold_start(&self, cancel: &CancellationToken) -> Result<Seed, CrawlError> {
        info!(home = %self.config.home_url, "Catalog is empty, resolving first episode");

        let page = self
            .fetcher
            .fetch(&self.config.home_url, cancel)
            .await
            .map_err(|e| match e {
                FetchError::Cancelled => CrawlError::Cancelled {
                    report: CrawlReport::default(),
                },
                other => CrawlError::Seed(other),
            })?;

        // The home page markup does not expose the first episode reliably,
        // so only its (redirected, localized) origin is used.
        let url = first_episode_url(&page.final_url, &self.config.first_episode_path)?;
        info!(url = %url, "Cold start seed");
        Ok(Seed::ColdStart(url))
    }
}

/// Replace the path of `base` with `path`, dropping any query or fragment.
pub fn first_episode_url(base: &str, path: &str) -> Result<String, CrawlError> {
    let mut url = Url::parse(base).map_err(|e| CrawlError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(CrawlError::InvalidUrl {
            url: base.to_string(),
            reason: "not a hierarchical URL".to_string(),
        });
    }

    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

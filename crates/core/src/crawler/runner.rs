//! Crawl controller implementation.
//!
//! Breadth-first traversal over episode pages:
//! dispatch -> visited check -> fetch -> extract -> insert -> discover links.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::CrawlerConfig;
use super::fetcher::{FetchError, PageFetcher};
use super::frontier::{Dispatch, Frontier};
use super::types::{CrawlError, CrawlReport};
use crate::catalog::EpisodeCatalog;
use crate::extractor::extract_page;
use crate::metrics;

/// Drives a single crawl run against the catalog.
pub struct CrawlController {
    config: CrawlerConfig,
    catalog: Arc<dyn EpisodeCatalog>,
    fetcher: Arc<dyn PageFetcher>,
}

impl CrawlController {
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

    /// Crawl from `seed` until the frontier is exhausted.
    ///
    /// The seed is always fetched. Every other URL is skipped when the
    /// catalog already holds a record for it. Malformed pages, fetch
    /// errors and pages that keep answering empty are logged and skipped;
    /// catalog errors end the run. Once `cancel` fires no further page is
    /// requested and [`CrawlError::Cancelled`] is returned, but a page
    /// already fetched is still stored.
    pub async fn run(
        &self,
        seed: &str,
        cancel: &CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let mut frontier = Frontier::with_seed(seed);
        let mut report = CrawlReport::default();

        info!(seed, "Starting crawl");

        while let Some(dispatch) = frontier.next() {
            if cancel.is_cancelled() {
                info!(pending = frontier.pending(), "Crawl cancelled");
                return Err(CrawlError::Cancelled { report });
            }

            if dispatch.is_skippable() && self.catalog.visited(&dispatch.url)? {
                debug!(url = %dispatch.url, "Skipping visited page");
                report.skipped_visited += 1;
                metrics::record_page("skipped");
                continue;
            }

            debug!(url = %dispatch.url, attempt = dispatch.attempt, "Getting page");
            let page = match self.fetcher.fetch(&dispatch.url, cancel).await {
                Ok(page) => page,
                Err(FetchError::Cancelled) => {
                    info!(url = %dispatch.url, "Crawl cancelled during fetch");
                    return Err(CrawlError::Cancelled { report });
                }
                Err(e) => {
                    warn!(url = %dispatch.url, error = %e, "Failed to fetch page");
                    report.failed_pages += 1;
                    metrics::record_page("error");
                    continue;
                }
            };
            report.pages_fetched += 1;

            if page.body.is_empty() {
                self.handle_empty(dispatch, &mut frontier, &mut report, cancel)
                    .await?;
                continue;
            }

            let extracted = match extract_page(&page.body, &dispatch.url) {
                Ok(extracted) => extracted,
                Err(e) => {
                    warn!(error = %e, "Skipping page");
                    report.malformed_pages += 1;
                    metrics::record_page("malformed");
                    continue;
                }
            };

            self.catalog.insert(&extracted.episode)?;
            report.episodes_stored += 1;
            metrics::record_page("stored");
            metrics::EPISODES_STORED.inc();
            info!(
                season = extracted.episode.season,
                episode = extracted.episode.episode,
                title = %extracted.episode.title,
                "Stored episode"
            );

            let (mut queued, mut known) = (0usize, 0usize);
            for link in extracted.links {
                if frontier.is_dispatched(&link) {
                    known += 1;
                } else if frontier.discover(link) {
                    queued += 1;
                }
            }
            debug!(url = %dispatch.url, queued, known, "Queued episode links");
        }

        info!(
            dispatched = frontier.dispatched(),
            "Crawl finished: {}", report
        );
        Ok(report)
    }

    /// Re-queue a page that answered with an empty body, with backoff.
    async fn handle_empty(
        &self,
        dispatch: Dispatch,
        frontier: &mut Frontier,
        report: &mut CrawlReport,
        cancel: &CancellationToken,
    ) -> Result<(), CrawlError> {
        metrics::record_page("empty");

        if dispatch.attempt >= self.config.max_empty_retries {
            warn!(
                url = %dispatch.url,
                attempts = dispatch.attempt + 1,
                "Page kept answering empty, giving up"
            );
            report.failed_pages += 1;
            return Ok(());
        }

        let delay = self.config.retry_delay(dispatch.attempt);
        debug!(url = %dispatch.url, ?delay, "Empty response, retrying");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(CrawlError::Cancelled { report: report.clone() });
            }
            _ = tokio::time::sleep(delay) => {}
        }

        report.empty_retries += 1;
        frontier.retry(dispatch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, Episode, SqliteCatalog};
    use crate::testing::{fixtures, MockFetcher};

    fn fast_config() -> CrawlerConfig {
        CrawlerConfig {
            max_empty_retries: 2,
            retry_base_delay_ms: 1,
            ..Default::default()
        }
    }

    fn controller(
        catalog: Arc<dyn EpisodeCatalog>,
        fetcher: Arc<MockFetcher>,
    ) -> CrawlController {
        CrawlController::new(fast_config(), catalog, fetcher)
    }

    #[tokio::test]
    async fn test_crawls_chain_of_pages() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_chain(1, 1..=3).await;

        let report = controller(catalog.clone(), fetcher.clone())
            .run(&fixtures::episode_url(1, 1), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.episodes_stored, 3);
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(catalog.count().unwrap(), 3);
        assert_eq!(catalog.last().unwrap(), fixtures::episode_url(1, 3));
    }

    #[tokio::test]
    async fn test_seed_fetched_even_when_visited() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        catalog.insert(&fixtures::episode(1, 1)).unwrap();

        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_chain(1, 1..=2).await;

        let report = controller(catalog.clone(), fetcher.clone())
            .run(&fixtures::episode_url(1, 1), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            fetcher.requested().await,
            vec![fixtures::episode_url(1, 1), fixtures::episode_url(1, 2)]
        );
        assert_eq!(report.episodes_stored, 2);
    }

    #[tokio::test]
    async fn test_visited_pages_are_not_fetched() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        for episode in 1..=3 {
            catalog.insert(&fixtures::episode(1, episode)).unwrap();
        }

        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_chain(1, 1..=4).await;

        // Page 3 links back to 2 and forward to 4
        let report = controller(catalog.clone(), fetcher.clone())
            .run(&fixtures::episode_url(1, 3), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            fetcher.requested().await,
            vec![fixtures::episode_url(1, 3), fixtures::episode_url(1, 4)]
        );
        assert_eq!(report.skipped_visited, 1);
        assert_eq!(catalog.count().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_page_discovered_twice_is_fetched_once() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(MockFetcher::new());

        // 1 links to 2 and 3, 2 links to 3
        fetcher
            .add_page(
                &fixtures::episode_url(1, 1),
                fixtures::EpisodePage::new(1, 1)
                    .link_to(1, 2)
                    .link_to(1, 3)
                    .render(),
            )
            .await;
        fetcher
            .add_page(
                &fixtures::episode_url(1, 2),
                fixtures::EpisodePage::new(1, 2).link_to(1, 3).render(),
            )
            .await;
        fetcher
            .add_page(
                &fixtures::episode_url(1, 3),
                fixtures::EpisodePage::new(1, 3).render(),
            )
            .await;

        controller(catalog.clone(), fetcher.clone())
            .run(&fixtures::episode_url(1, 1), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(fetcher.request_count(&fixtures::episode_url(1, 3)).await, 1);
        assert_eq!(catalog.count().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_malformed_page_is_skipped_without_following_links() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(MockFetcher::new());

        fetcher
            .add_page(
                &fixtures::episode_url(1, 1),
                fixtures::EpisodePage::new(1, 1)
                    .link_to(1, 2)
                    .link_to(1, 3)
                    .render(),
            )
            .await;
        // Page 2 is malformed but links to 4, which must never be reached
        fetcher
            .add_page(
                &fixtures::episode_url(1, 2),
                fixtures::EpisodePage::new(1, 2)
                    .without(crate::extractor::OG_IMAGE)
                    .link_to(1, 4)
                    .render(),
            )
            .await;
        fetcher
            .add_page(
                &fixtures::episode_url(1, 3),
                fixtures::EpisodePage::new(1, 3).render(),
            )
            .await;
        fetcher
            .add_page(
                &fixtures::episode_url(1, 4),
                fixtures::EpisodePage::new(1, 4).render(),
            )
            .await;

        let report = controller(catalog.clone(), fetcher.clone())
            .run(&fixtures::episode_url(1, 1), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.malformed_pages, 1);
        assert_eq!(report.episodes_stored, 2);
        assert!(!catalog.visited(&fixtures::episode_url(1, 2)).unwrap());
        assert_eq!(fetcher.request_count(&fixtures::episode_url(1, 4)).await, 0);
    }

    #[tokio::test]
    async fn test_fetch_error_is_skipped() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(MockFetcher::new());
        fetcher
            .add_page(
                &fixtures::episode_url(1, 1),
                fixtures::EpisodePage::new(1, 1)
                    .link_to(1, 2)
                    .link_to(1, 3)
                    .render(),
            )
            .await;
        // 1x2 is unknown to the mock and answers 404
        fetcher
            .add_page(
                &fixtures::episode_url(1, 3),
                fixtures::EpisodePage::new(1, 3).render(),
            )
            .await;

        let report = controller(catalog.clone(), fetcher)
            .run(&fixtures::episode_url(1, 1), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.failed_pages, 1);
        assert_eq!(report.episodes_stored, 2);
    }

    #[tokio::test]
    async fn test_empty_body_is_retried() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_chain(1, 1..=1).await;
        fetcher.fail_empty(&fixtures::episode_url(1, 1), 2).await;

        let report = controller(catalog.clone(), fetcher.clone())
            .run(&fixtures::episode_url(1, 1), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(fetcher.request_count(&fixtures::episode_url(1, 1)).await, 3);
        assert_eq!(report.empty_retries, 2);
        assert_eq!(report.episodes_stored, 1);
    }

    #[tokio::test]
    async fn test_empty_body_retries_are_bounded() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_chain(1, 1..=1).await;
        fetcher.fail_empty(&fixtures::episode_url(1, 1), 100).await;

        let report = controller(catalog.clone(), fetcher.clone())
            .run(&fixtures::episode_url(1, 1), &CancellationToken::new())
            .await
            .unwrap();

        // One initial request plus max_empty_retries
        assert_eq!(fetcher.request_count(&fixtures::episode_url(1, 1)).await, 3);
        assert_eq!(report.failed_pages, 1);
        assert_eq!(catalog.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_chain(1, 1..=3).await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = controller(catalog.clone(), fetcher.clone())
            .run(&fixtures::episode_url(1, 1), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(fetcher.requested().await.is_empty());
        assert_eq!(catalog.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_dispatch_but_keeps_fetched_page() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_chain(1, 1..=3).await;

        let cancel = CancellationToken::new();
        fetcher.cancel_after(1, cancel.clone()).await;

        let err = controller(catalog.clone(), fetcher.clone())
            .run(&fixtures::episode_url(1, 1), &cancel)
            .await
            .unwrap_err();

        match err {
            CrawlError::Cancelled { report } => assert_eq!(report.episodes_stored, 1),
            other => panic!("expected cancellation, got {:?}", other),
        }
        assert_eq!(catalog.count().unwrap(), 1);
        assert_eq!(fetcher.requested().await.len(), 1);
    }

    struct FailingCatalog;

    impl EpisodeCatalog for FailingCatalog {
        fn insert(&self, _episode: &Episode) -> Result<(), CatalogError> {
            Err(CatalogError::Database("disk full".to_string()))
        }
        fn visited(&self, _url: &str) -> Result<bool, CatalogError> {
            Ok(false)
        }
        fn last(&self) -> Result<String, CatalogError> {
            Err(CatalogError::NotFound("empty".to_string()))
        }
        fn by_season(&self, _season: u32) -> Result<Vec<Episode>, CatalogError> {
            Err(CatalogError::NotFound("empty".to_string()))
        }
        fn by_episode(&self, _season: u32, _episode: u32) -> Result<Episode, CatalogError> {
            Err(CatalogError::NotFound("empty".to_string()))
        }
        fn all(&self) -> Result<Vec<Episode>, CatalogError> {
            Err(CatalogError::NotFound("empty".to_string()))
        }
        fn count(&self) -> Result<u64, CatalogError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_run() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_chain(1, 1..=3).await;

        let err = controller(Arc::new(FailingCatalog), fetcher.clone())
            .run(&fixtures::episode_url(1, 1), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Catalog(CatalogError::Database(_))));
        assert_eq!(fetcher.requested().await.len(), 1);
    }
}

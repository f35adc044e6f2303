//! Crawl and download lifecycle integration tests.
//!
//! These tests drive complete runs over an on-disk catalog:
//! seed -> crawl -> catalog -> selection -> download

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use southpark_core::{
    crawler::Seed,
    testing::{fixtures, MockDownloader, MockFetcher},
    CrawlController, CrawlerConfig, DownloadOrchestrator, DownloaderConfig, EpisodeCatalog,
    SeedResolver, Selection, SqliteCatalog,
};

/// Test helper owning an on-disk catalog.
struct TestHarness {
    db_path: PathBuf,
    out_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            db_path: temp_dir.path().join("southpark.db"),
            out_dir: temp_dir.path().join("downloads"),
            _temp_dir: temp_dir,
        }
    }

    fn catalog(&self) -> Arc<SqliteCatalog> {
        Arc::new(SqliteCatalog::new(&self.db_path).expect("Failed to open catalog"))
    }

    fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            home_url: format!("{}/", fixtures::BASE_URL),
            first_episode_path: fixtures::episode_path(1, 1),
            retry_base_delay_ms: 1,
            ..Default::default()
        }
    }

    fn downloader_config(&self, dry_run: bool) -> DownloaderConfig {
        DownloaderConfig {
            out_dir: self.out_dir.clone(),
            dry_run,
            ..Default::default()
        }
    }

    /// One full crawl run: resolve the seed, then crawl from it.
    async fn crawl(&self, fetcher: Arc<MockFetcher>) -> Seed {
        let catalog = self.catalog();
        let cancel = CancellationToken::new();

        let seed = SeedResolver::new(self.crawler_config(), catalog.clone(), fetcher.clone())
            .resolve(&cancel)
            .await
            .expect("Failed to resolve seed");
        CrawlController::new(self.crawler_config(), catalog, fetcher)
            .run(seed.url(), &cancel)
            .await
            .expect("Crawl failed");
        seed
    }
}

async fn site(season: u32, episodes: std::ops::RangeInclusive<u32>) -> Arc<MockFetcher> {
    let fetcher = Arc::new(MockFetcher::new());
    let home = format!("{}/", fixtures::BASE_URL);
    fetcher.add_redirect(&home, &home, "<html></html>").await;
    fetcher.add_chain(season, episodes).await;
    fetcher
}

#[tokio::test]
async fn test_cold_start_populates_catalog() {
    let harness = TestHarness::new();
    let fetcher = site(1, 1..=4).await;

    let seed = harness.crawl(fetcher.clone()).await;

    assert_eq!(seed, Seed::ColdStart(fixtures::episode_url(1, 1)));
    let catalog = harness.catalog();
    assert_eq!(catalog.count().unwrap(), 4);
    assert_eq!(catalog.last().unwrap(), fixtures::episode_url(1, 4));
    assert_eq!(catalog.by_episode(1, 2).unwrap(), fixtures::episode(1, 2));
}

#[tokio::test]
async fn test_second_run_resumes_and_only_refetches_seed() {
    let harness = TestHarness::new();
    harness.crawl(site(1, 1..=3).await).await;

    let fetcher = site(1, 1..=3).await;
    let seed = harness.crawl(fetcher.clone()).await;

    assert_eq!(seed, Seed::Resume(fixtures::episode_url(1, 3)));
    assert_eq!(fetcher.requested().await, vec![fixtures::episode_url(1, 3)]);
    assert_eq!(harness.catalog().count().unwrap(), 3);
}

#[tokio::test]
async fn test_resume_picks_up_new_episodes() {
    let harness = TestHarness::new();
    harness.crawl(site(1, 1..=3).await).await;

    // Two episodes aired since
    let fetcher = site(1, 1..=5).await;
    harness.crawl(fetcher.clone()).await;

    assert_eq!(
        fetcher.requested().await,
        vec![
            fixtures::episode_url(1, 3),
            fixtures::episode_url(1, 4),
            fixtures::episode_url(1, 5),
        ]
    );
    let catalog = harness.catalog();
    assert_eq!(catalog.count().unwrap(), 5);
    assert_eq!(catalog.last().unwrap(), fixtures::episode_url(1, 5));
}

#[tokio::test]
async fn test_crawl_then_download_season() {
    let harness = TestHarness::new();
    let fetcher = site(1, 1..=2).await;
    fetcher.add_chain(2, 1..=3).await;
    // Season finale links on to the next premiere
    fetcher
        .add_page(
            &fixtures::episode_url(1, 2),
            fixtures::EpisodePage::new(1, 2)
                .link_to(1, 1)
                .link_to(2, 1)
                .render(),
        )
        .await;
    harness.crawl(fetcher).await;
    assert_eq!(harness.catalog().count().unwrap(), 5);

    let downloader = MockDownloader::new();
    let report = DownloadOrchestrator::new(
        harness.downloader_config(false),
        harness.catalog(),
        downloader.clone(),
    )
    .run(&Selection::Season { season: 2 }, &CancellationToken::new())
    .await
    .unwrap();

    assert_eq!(report.completed.len(), 3);
    let jobs = downloader.jobs().await;
    assert_eq!(jobs[0].url, fixtures::episode_url(2, 1));
    assert_eq!(jobs[0].output_dir, harness.out_dir.join("S02"));
    assert_eq!(jobs[0].output_template, "South_Park_S02E01.%(ext)s");
}

#[tokio::test]
async fn test_crawl_then_dry_run() {
    let harness = TestHarness::new();
    harness.crawl(site(1, 1..=2).await).await;

    let downloader = MockDownloader::new();
    let report = DownloadOrchestrator::new(
        harness.downloader_config(true),
        harness.catalog(),
        downloader.clone(),
    )
    .run(&Selection::All, &CancellationToken::new())
    .await
    .unwrap();

    let planned: Vec<_> = report.planned.iter().map(|job| job.url.clone()).collect();
    assert_eq!(
        planned,
        vec![fixtures::episode_url(1, 1), fixtures::episode_url(1, 2)]
    );
    assert!(downloader.jobs().await.is_empty());
    assert!(!harness.out_dir.exists());
}

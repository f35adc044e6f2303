pub mod catalog;
pub mod config;
pub mod crawler;
pub mod downloader;
pub mod extractor;
pub mod metrics;
pub mod testing;

pub use catalog::{CatalogError, Episode, EpisodeCatalog, SqliteCatalog};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
};
pub use crawler::{
    CrawlController, CrawlError, CrawlReport, CrawlerConfig, HttpFetcher, PageFetcher, Seed,
    SeedResolver,
};
pub use downloader::{
    DownloadError, DownloadOrchestrator, DownloadReport, Downloader, DownloaderConfig, Selection,
    YtDlpDownloader,
};
pub use extractor::{extract_page, ExtractError, ExtractedPage};

//! Crawl-and-catalog pipeline.
//!
//! A crawl run resolves a [`Seed`], then walks episode pages breadth-first,
//! storing one catalog record per page and following episode links to
//! pages not catalogued yet. Runs are resumable: the next run starts from
//! the most recent catalogued episode and skips everything already stored.
//!
//! # Example
//!
//! ```ignore
//! use southpark_core::crawler::{CrawlController, CrawlerConfig, HttpFetcher, SeedResolver};
//!
//! let fetcher = Arc::new(HttpFetcher::new(&config)?);
//! let seed = SeedResolver::new(config.clone(), catalog.clone(), fetcher.clone())
//!     .resolve(&cancel)
//!     .await?;
//! let report = CrawlController::new(config, catalog, fetcher)
//!     .run(seed.url(), &cancel)
//!     .await?;
//! println!("{}", report);
//! ```

mod config;
mod fetcher;
mod frontier;
mod runner;
mod seed;
mod types;

pub use config::CrawlerConfig;
pub use fetcher::{FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use frontier::{Dispatch, DispatchKind, Frontier};
pub use runner::CrawlController;
pub use seed::{first_episode_url, Seed, SeedResolver};
pub use types::{CrawlError, CrawlReport};

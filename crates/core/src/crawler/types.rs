//! Types for crawl runs.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::fetcher::FetchError;
use crate::catalog::CatalogError;

/// Counters for a single crawl run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    /// Pages fetched successfully (including empty responses).
    pub pages_fetched: usize,
    /// Records inserted into the catalog.
    pub episodes_stored: usize,
    /// Pages without a complete set of metadata.
    pub malformed_pages: usize,
    /// Discovered URLs skipped because they were already catalogued.
    pub skipped_visited: usize,
    /// Re-requests caused by empty responses.
    pub empty_retries: usize,
    /// Pages abandoned after a fetch error or exhausted retries.
    pub failed_pages: usize,
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fetched, {} stored, {} malformed, {} skipped, {} retries, {} failed",
            self.pages_fetched,
            self.episodes_stored,
            self.malformed_pages,
            self.skipped_visited,
            self.empty_retries,
            self.failed_pages
        )
    }
}

/// Errors that end a crawl run.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to resolve seed URL: {0}")]
    Seed(#[source] FetchError),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Crawl cancelled ({report})")]
    Cancelled { report: CrawlReport },
}

impl CrawlError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

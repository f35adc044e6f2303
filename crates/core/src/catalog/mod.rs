//! Episode catalog - the durable record of every episode page seen so far.
//!
//! The catalog is the single source of truth for "already visited": the
//! crawler consults it before fetching a page and resumes from its most
//! recent entry, and the download orchestrator selects from it.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

/// Trait for episode catalog storage.
pub trait EpisodeCatalog: Send + Sync {
    /// Insert or replace the record keyed by `(season, episode)`.
    ///
    /// The prior record, if any, is replaced entirely.
    fn insert(&self, episode: &Episode) -> Result<(), CatalogError>;

    /// Whether any record was extracted from exactly this URL.
    fn visited(&self, url: &str) -> Result<bool, CatalogError>;

    /// URL of the record with the highest `(season, episode)`.
    ///
    /// Ties cannot occur since the pair is the primary key; ordering is
    /// season descending, then episode descending.
    fn last(&self) -> Result<String, CatalogError>;

    /// All records of a season, ordered by episode.
    fn by_season(&self, season: u32) -> Result<Vec<Episode>, CatalogError>;

    /// A single record.
    fn by_episode(&self, season: u32, episode: u32) -> Result<Episode, CatalogError>;

    /// Every record, ordered by `(season, episode)`.
    fn all(&self) -> Result<Vec<Episode>, CatalogError>;

    /// Number of records.
    fn count(&self) -> Result<u64, CatalogError>;
}

//! Types for the episode catalog.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Textual layout of the `date` column (UTC, millisecond precision).
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A catalogued episode, keyed by `(season, episode)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Season number (1-based).
    pub season: u32,
    /// Episode number within the season.
    pub episode: u32,
    /// Episode title.
    pub title: String,
    /// Page URL the record was extracted from.
    pub url: String,
    /// Short synopsis.
    pub description: String,
    /// Preview image URL.
    pub image_url: String,
    /// Original release timestamp.
    pub date: DateTime<Utc>,
}

impl Episode {
    /// `(season, episode)` primary key.
    pub fn key(&self) -> (u32, u32) {
        (self.season, self.episode)
    }

    /// Release date in the catalog's storage layout.
    pub fn stored_date(&self) -> String {
        self.date.format(STORED_DATE_FORMAT).to_string()
    }
}

/// Parse a date from the catalog's storage layout.
pub fn parse_stored_date(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, STORED_DATE_FORMAT).map(|dt| dt.and_utc())
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

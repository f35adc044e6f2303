//! Episode page extraction.
//!
//! Pure transformation from a fetched HTML document to an [`Episode`]
//! record plus the episode links found on the page. No I/O happens here;
//! the crawler decides what to do with the result.

mod links;
mod metadata;

pub use links::{extract_episode_links, is_episode_link};
pub use metadata::{
    extract_episode, parse_release_date, EPISODE_NUMBER, EPISODE_TITLE, OG_DESCRIPTION, OG_IMAGE,
    RELEASE_DATE, RELEASE_DATE_FORMAT, REQUIRED_PROPERTIES, SEASON_NUMBER,
};

use scraper::Html;
use thiserror::Error;

use crate::catalog::Episode;

/// Errors produced when a page does not carry a complete episode record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Malformed page {url}: missing {missing:?}")]
    MalformedPage {
        url: String,
        missing: Vec<&'static str>,
    },

    #[error("Malformed page {url}: invalid {property} value {value:?}")]
    InvalidValue {
        url: String,
        property: &'static str,
        value: String,
    },
}

/// A successfully extracted episode page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub episode: Episode,
    /// Absolute episode links, deduplicated, in document order.
    pub links: Vec<String>,
}

/// Parse `html` once and extract both the record and its outbound episode links.
pub fn extract_page(html: &str, page_url: &str) -> Result<ExtractedPage, ExtractError> {
    let document = Html::parse_document(html);
    let episode = extract_episode(&document, page_url)?;
    let links = extract_episode_links(&document, page_url);
    Ok(ExtractedPage { episode, links })
}

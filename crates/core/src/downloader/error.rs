//! Error types for the download module.

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can occur while downloading episodes.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Download tool executable not found.
    #[error("Download tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// A program the tool depends on is not available.
    #[error("Required program not available: {name}")]
    ProgramNotFound { name: String },

    /// Tool exited unsuccessfully.
    #[error("Download of {url} failed with exit code {code:?}")]
    ToolFailed {
        url: String,
        code: Option<i32>,
        output: String,
    },

    /// The single requested episode is not in the catalog.
    #[error("Season {season} episode {episode} is not in the catalog")]
    EpisodeNotFound { season: u32, episode: u32 },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download cancelled")]
    Cancelled,
}

impl DownloadError {
    pub fn tool_failed(url: impl Into<String>, code: Option<i32>, output: impl Into<String>) -> Self {
        Self::ToolFailed {
            url: url.into(),
            code,
            output: output.into(),
        }
    }
}

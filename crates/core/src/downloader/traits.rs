//! Trait definitions for the download module.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::DownloadError;
use super::types::DownloadJob;

/// Downloads a single episode.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Returns the name of this downloader implementation.
    fn name(&self) -> &str;

    /// Checks that the tool and everything it depends on is available.
    async fn validate(&self) -> Result<(), DownloadError>;

    /// Downloads one job. Returns [`DownloadError::Cancelled`] if `cancel`
    /// fires before or during the download.
    async fn download(
        &self,
        job: &DownloadJob,
        cancel: &CancellationToken,
    ) -> Result<(), DownloadError>;
}

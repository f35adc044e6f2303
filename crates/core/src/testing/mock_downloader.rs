//! Mock downloader for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::downloader::{DownloadError, DownloadJob, Downloader};

/// Mock implementation of the Downloader trait.
///
/// Clones share state, so a test can keep a handle after moving one into
/// an orchestrator. Every attempted job is recorded, including failed ones.
#[derive(Debug, Clone, Default)]
pub struct MockDownloader {
    jobs: Arc<RwLock<Vec<DownloadJob>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make downloads of `url` fail with a non-zero exit.
    pub async fn fail_on(&self, url: &str) {
        self.failing.write().await.insert(url.to_string());
    }

    /// Jobs attempted so far, in order.
    pub async fn jobs(&self) -> Vec<DownloadJob> {
        self.jobs.read().await.clone()
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), DownloadError> {
        Ok(())
    }

    async fn download(
        &self,
        job: &DownloadJob,
        cancel: &CancellationToken,
    ) -> Result<(), DownloadError> {
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        self.jobs.write().await.push(job.clone());

        if self.failing.read().await.contains(&job.url) {
            return Err(DownloadError::tool_failed(
                job.url.clone(),
                Some(1),
                "ERROR: mock failure",
            ));
        }
        Ok(())
    }
}

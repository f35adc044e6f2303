//! Download orchestration: catalog selection -> one tool invocation per episode.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::config::DownloaderConfig;
use super::error::DownloadError;
use super::traits::Downloader;
use super::types::{DownloadJob, DownloadReport, Selection};
use crate::catalog::{CatalogError, Episode, EpisodeCatalog};
use crate::metrics;

/// Selects catalog entries and downloads them one after another.
pub struct DownloadOrchestrator<D>
where
    D: Downloader + 'static,
{
    config: DownloaderConfig,
    catalog: Arc<dyn EpisodeCatalog>,
    downloader: D,
}

impl<D> DownloadOrchestrator<D>
where
    D: Downloader + 'static,
{
    pub fn new(config: DownloaderConfig, catalog: Arc<dyn EpisodeCatalog>, downloader: D) -> Self {
        Self {
            config,
            catalog,
            downloader,
        }
    }

    /// Resolve a selection against the catalog.
    ///
    /// An empty season or catalog yields an empty list; a missing single
    /// episode is [`DownloadError::EpisodeNotFound`].
    pub fn select(&self, selection: &Selection) -> Result<Vec<Episode>, DownloadError> {
        let result = match *selection {
            Selection::All => self.catalog.all(),
            Selection::Season { season } => self.catalog.by_season(season),
            Selection::Episode { season, episode } => {
                return match self.catalog.by_episode(season, episode) {
                    Ok(found) => Ok(vec![found]),
                    Err(CatalogError::NotFound(_)) => {
                        Err(DownloadError::EpisodeNotFound { season, episode })
                    }
                    Err(e) => Err(e.into()),
                };
            }
        };

        match result {
            Ok(episodes) => Ok(episodes),
            Err(CatalogError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Download every selected episode, stopping at the first failure.
    pub async fn run(
        &self,
        selection: &Selection,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport, DownloadError> {
        let episodes = self.select(selection)?;
        let mut report = DownloadReport::default();

        if episodes.is_empty() {
            info!(%selection, "Nothing to download");
            return Ok(report);
        }

        info!(
            %selection,
            count = episodes.len(),
            downloader = self.downloader.name(),
            dry_run = self.config.dry_run,
            "Starting downloads"
        );

        for episode in &episodes {
            if cancel.is_cancelled() {
                return Err(DownloadError::Cancelled);
            }

            let job = DownloadJob::for_episode(episode, &self.config.out_dir);

            if self.config.dry_run {
                info!(url = %job.url, dir = %job.output_dir.display(), "Would download");
                metrics::record_download("dry_run");
                report.planned.push(job);
                continue;
            }

            info!(
                season = job.season,
                episode = job.episode,
                url = %job.url,
                "Downloading episode"
            );
            if let Err(e) = self.downloader.download(&job, cancel).await {
                if !matches!(e, DownloadError::Cancelled) {
                    error!(url = %job.url, error = %e, "Download failed");
                    metrics::record_download("failed");
                }
                return Err(e);
            }
            metrics::record_download("ok");
            report.completed.push(job);
        }

        Ok(report)
    }
}

//! Episode downloads through an external tool.
//!
//! The [`DownloadOrchestrator`] resolves a [`Selection`] against the
//! catalog and hands each episode to a [`Downloader`], one at a time.
//! The first failing download aborts the rest of the batch.
//!
//! # Example
//!
//! ```ignore
//! use southpark_core::downloader::{DownloadOrchestrator, Selection, YtDlpDownloader};
//!
//! let downloader = YtDlpDownloader::new(config.clone());
//! downloader.validate().await?;
//!
//! let orchestrator = DownloadOrchestrator::new(config, catalog, downloader);
//! let report = orchestrator.run(&Selection::Season { season: 1 }, &cancel).await?;
//! println!("Downloaded {} episodes", report.completed.len());
//! ```

mod config;
mod error;
mod orchestrator;
mod traits;
mod types;
mod ytdlp;

pub use config::DownloaderConfig;
pub use error::DownloadError;
pub use orchestrator::DownloadOrchestrator;
pub use traits::Downloader;
pub use types::{output_template, season_dir, DownloadJob, DownloadReport, Selection};
pub use ytdlp::YtDlpDownloader;

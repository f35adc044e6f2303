mod bootstrap;
mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use southpark_core::{
    load_config, metrics, validate_config, CrawlController, DownloadOrchestrator, Downloader,
    EpisodeCatalog, HttpFetcher, PageFetcher, SeedResolver, SqliteCatalog, YtDlpDownloader,
};

use cli::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| (if args.verbose { "debug" } else { "info" }).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics_file = args.metrics_file.clone();
    let result = run(args).await;

    // Failed and cancelled runs still report their counters
    if let Some(path) = &metrics_file {
        if let Err(e) = write_metrics(path) {
            error!("{:#}", e);
        }
    }

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn write_metrics(path: &Path) -> Result<()> {
    let text = metrics::render().context("Failed to render metrics")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write metrics to {:?}", path))
}

async fn run(args: Args) -> Result<()> {
    // Selection first, before touching disk or network
    let selection = args.selection()?;

    let mut config = load_config(args.config.as_deref()).context("Failed to load config")?;
    args.apply(&mut config);
    validate_config(&config).context("Configuration validation failed")?;

    info!("Database path: {:?}", config.database.path);
    info!("Selection: {}", selection);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    bootstrap::ensure_tool(&config.downloader, args.reinitialize)
        .await
        .context("Failed to set up download tool")?;

    let downloader = YtDlpDownloader::new(config.downloader.clone());
    downloader
        .validate()
        .await
        .context("Download tool preflight failed")?;

    std::fs::create_dir_all(&config.downloader.out_dir).with_context(|| {
        format!(
            "Failed to create output directory {:?}",
            config.downloader.out_dir
        )
    })?;
    if let Some(parent) = config.database.path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create catalog directory {:?}", parent))?;
    }

    let catalog: Arc<dyn EpisodeCatalog> = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to open episode catalog")?,
    );
    info!("Catalog holds {} episodes", catalog.count()?);

    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(HttpFetcher::new(&config.crawler).context("Failed to create HTTP client")?);

    let seed = SeedResolver::new(config.crawler.clone(), catalog.clone(), fetcher.clone())
        .resolve(&cancel)
        .await
        .context("Failed to resolve crawl seed")?;

    let report = CrawlController::new(config.crawler.clone(), catalog.clone(), fetcher)
        .run(seed.url(), &cancel)
        .await
        .context("Failed to collect episode urls")?;
    info!("Crawl: {}", report);

    let report = DownloadOrchestrator::new(config.downloader.clone(), catalog, downloader)
        .run(&selection, &cancel)
        .await
        .context("Download failed")?;

    for job in &report.planned {
        println!("Would download: {}", job.url);
    }
    info!(
        "Downloaded {} episodes, {} planned",
        report.completed.len(),
        report.planned.len()
    );

    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown requested, finishing current step");
    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_metrics() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("southpark.prom");

        write_metrics(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("southpark_episodes_stored_total"));
    }

    #[test]
    fn test_write_metrics_to_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        assert!(write_metrics(&temp.path().join("missing").join("m.prom")).is_err());
    }
}

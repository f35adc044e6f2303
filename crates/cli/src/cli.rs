use std::path::PathBuf;

use clap::Parser;
use southpark_core::{Config, Selection};

/// Download new South Park episodes.
#[derive(Debug, Parser)]
#[command(name = "southpark-downloader", version, about)]
pub struct Args {
    /// Download all episodes
    #[arg(short, long)]
    pub all: bool,

    /// Download all episodes of a season
    #[arg(short, long, value_name = "N")]
    pub season: Option<u32>,

    /// Download a specific episode (requires --season)
    #[arg(short, long, value_name = "N")]
    pub episode: Option<u32>,

    /// Don't download, just print out URLs
    #[arg(short, long)]
    pub dry_run: bool,

    /// Remove and re-clone the yt-dlp checkout
    #[arg(short = 'i', long)]
    pub reinitialize: bool,

    /// TOML configuration file
    #[arg(long, value_name = "FILE", env = "SOUTHPARK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the episode catalog
    #[arg(short = 'c', long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Path to the yt-dlp checkout
    #[arg(short = 'y', long, value_name = "DIR")]
    pub yt_dlp_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// yt-dlp repository URL
    #[arg(short, long, value_name = "URL")]
    pub repo_url: Option<String>,

    /// yt-dlp tag or branch
    #[arg(short, long, value_name = "REF")]
    pub branch: Option<String>,

    /// User agent for page requests
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Minimum download rate, e.g. 1M
    #[arg(long, value_name = "RATE")]
    pub min_rate: Option<String>,

    /// Write Prometheus metrics to this file after the run
    #[arg(long, value_name = "FILE")]
    pub metrics_file: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn selection(&self) -> Result<Selection, southpark_core::ConfigError> {
        Selection::from_flags(self.all, self.season, self.episode)
    }

    /// Flags win over file and environment settings.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.config_dir {
            config.database.path = dir.join("southpark.db");
        }
        if let Some(dir) = &self.yt_dlp_dir {
            config.downloader.tool_dir = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            config.downloader.out_dir = dir.clone();
        }
        if let Some(url) = &self.repo_url {
            config.downloader.repo_url = url.clone();
        }
        if let Some(branch) = &self.branch {
            config.downloader.git_ref = branch.clone();
        }
        if let Some(user_agent) = &self.user_agent {
            config.crawler.user_agent = user_agent.clone();
        }
        if let Some(rate) = &self.min_rate {
            config.downloader.min_rate = rate.clone();
        }
        if self.dry_run {
            config.downloader.dry_run = true;
        }
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::crawler::CrawlerConfig;
use crate::downloader::DownloaderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// `$HOME/.config/southpark-downloader`, or the working directory without a home.
pub fn default_config_dir() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".config").join("southpark-downloader"))
        .unwrap_or_else(|| PathBuf::from("./"))
}

fn default_db_path() -> PathBuf {
    default_config_dir().join("southpark.db")
}

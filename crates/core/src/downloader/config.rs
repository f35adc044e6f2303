//! Configuration for the download orchestrator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the external download tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Checkout of the download tool.
    #[serde(default = "default_tool_dir")]
    pub tool_dir: PathBuf,

    /// Explicit executable, overriding the launcher script inside `tool_dir`.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Root directory for downloaded episodes.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Throttle rate below which the tool re-extracts, e.g. `1M`.
    #[serde(default = "default_min_rate")]
    pub min_rate: String,

    /// Fragments downloaded in parallel (default: available parallelism).
    #[serde(default)]
    pub concurrent_fragments: Option<usize>,

    /// Repository the tool is cloned from.
    #[serde(default = "default_repo_url")]
    pub repo_url: String,

    /// Tag or branch checked out.
    #[serde(default = "default_git_ref")]
    pub git_ref: String,

    /// Programs the tool shells out to; each must answer `-version`.
    #[serde(default = "default_required_programs")]
    pub required_programs: Vec<String>,

    /// Print what would be downloaded instead of downloading.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_tool_dir() -> PathBuf {
    PathBuf::from("./yt-dlp")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_min_rate() -> String {
    "1M".to_string()
}

fn default_repo_url() -> String {
    "https://github.com/yt-dlp/yt-dlp.git".to_string()
}

fn default_git_ref() -> String {
    "2023.03.04".to_string()
}

fn default_required_programs() -> Vec<String> {
    vec!["ffmpeg".to_string()]
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            tool_dir: default_tool_dir(),
            executable: None,
            out_dir: default_out_dir(),
            min_rate: default_min_rate(),
            concurrent_fragments: None,
            repo_url: default_repo_url(),
            git_ref: default_git_ref(),
            required_programs: default_required_programs(),
            dry_run: false,
        }
    }
}

impl DownloaderConfig {
    /// Launcher script shipped in the tool's source tree.
    pub fn launcher_name() -> &'static str {
        if cfg!(windows) {
            "yt-dlp.cmd"
        } else {
            "yt-dlp.sh"
        }
    }

    /// Executable to invoke.
    pub fn executable_path(&self) -> PathBuf {
        self.executable
            .clone()
            .unwrap_or_else(|| self.tool_dir.join(Self::launcher_name()))
    }

    /// Fragment concurrency passed to the tool.
    pub fn fragments(&self) -> usize {
        self.concurrent_fragments.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

//! Types for the download module.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::Episode;
use crate::config::ConfigError;

/// Which catalog entries to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Selection {
    All,
    Season { season: u32 },
    Episode { season: u32, episode: u32 },
}

impl Selection {
    /// Build a selection from the mutually exclusive command line flags.
    pub fn from_flags(
        all: bool,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<Self, ConfigError> {
        match (all, season, episode) {
            (true, None, None) => Ok(Self::All),
            (true, _, _) => Err(ConfigError::ValidationError(
                "cannot use --all together with --season or --episode".to_string(),
            )),
            (false, None, None) => Err(ConfigError::ValidationError(
                "must specify either --all, --season, or --season and --episode".to_string(),
            )),
            (false, None, Some(_)) => Err(ConfigError::ValidationError(
                "--episode requires --season".to_string(),
            )),
            (false, Some(0), _) => Err(ConfigError::ValidationError(
                "season must be greater than 0".to_string(),
            )),
            (false, Some(season), None) => Ok(Self::Season { season }),
            (false, Some(season), Some(episode)) => Ok(Self::Episode { season, episode }),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all episodes"),
            Self::Season { season } => write!(f, "season {}", season),
            Self::Episode { season, episode } => write!(f, "S{:02}E{:02}", season, episode),
        }
    }
}

/// One invocation of the download tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadJob {
    pub season: u32,
    pub episode: u32,
    /// Episode page handed to the tool.
    pub url: String,
    /// Working directory of the tool, `<out_dir>/Sxx`.
    pub output_dir: PathBuf,
    /// Tool output template, e.g. `South_Park_S01E02.%(ext)s`.
    pub output_template: String,
}

impl DownloadJob {
    pub fn for_episode(episode: &Episode, out_dir: &Path) -> Self {
        Self {
            season: episode.season,
            episode: episode.episode,
            url: episode.url.clone(),
            output_dir: out_dir.join(season_dir(episode.season)),
            output_template: output_template(episode.season, episode.episode),
        }
    }
}

/// Per-season sub-directory name, e.g. `S07`.
pub fn season_dir(season: u32) -> String {
    format!("S{:02}", season)
}

/// File name template with the extension left to the tool.
pub fn output_template(season: u32, episode: u32) -> String {
    format!("South_Park_S{:02}E{:02}.%(ext)s", season, episode)
}

/// Outcome of a download batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadReport {
    /// Jobs the tool completed.
    pub completed: Vec<DownloadJob>,
    /// Jobs only printed (dry run).
    pub planned: Vec<DownloadJob>,
}

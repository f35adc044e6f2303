//! yt-dlp checkout management.

use std::path::Path;

use anyhow::{bail, Context, Result};
use southpark_core::DownloaderConfig;
use tokio::process::Command;
use tracing::info;

/// Make sure the tool checkout exists, cloning it when missing.
///
/// With `reinitialize` an existing checkout is removed first.
pub async fn ensure_tool(config: &DownloaderConfig, reinitialize: bool) -> Result<()> {
    if config.executable.is_some() && !reinitialize {
        return Ok(());
    }

    if !prepare_tool_dir(&config.tool_dir, reinitialize)? {
        return Ok(());
    }

    info!(
        repo = %config.repo_url,
        git_ref = %config.git_ref,
        dir = %config.tool_dir.display(),
        "Cloning download tool"
    );

    let output = Command::new("git")
        .args(clone_args(config))
        .kill_on_drop(true)
        .output()
        .await
        .context("Failed to run git")?;

    if !output.status.success() {
        bail!(
            "git clone of {} failed: {}",
            config.repo_url,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// Returns whether a clone is needed.
pub fn prepare_tool_dir(dir: &Path, reinitialize: bool) -> Result<bool> {
    match std::fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => bail!("not a directory: {}", dir.display()),
        Ok(_) if reinitialize => {
            info!(dir = %dir.display(), "Removing download tool checkout");
            std::fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to remove {}", dir.display()))?;
            Ok(true)
        }
        Ok(_) => Ok(false),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e).with_context(|| format!("Failed to inspect {}", dir.display())),
    }
}

pub fn clone_args(config: &DownloaderConfig) -> Vec<String> {
    vec![
        "clone".to_string(),
        "-c".to_string(),
        "advice.detachedHead=false".to_string(),
        "--depth".to_string(),
        "1".to_string(),
        "--branch".to_string(),
        config.git_ref.clone(),
        config.repo_url.clone(),
        config.tool_dir.display().to_string(),
    ]
}

//! yt-dlp based downloader implementation.

use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::config::DownloaderConfig;
use super::error::DownloadError;
use super::traits::Downloader;
use super::types::DownloadJob;

/// How much captured tool output is kept in [`DownloadError::ToolFailed`].
const OUTPUT_TAIL_BYTES: usize = 4096;

/// Runs the yt-dlp launcher once per episode.
pub struct YtDlpDownloader {
    config: DownloaderConfig,
}

impl YtDlpDownloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// Builds the tool's arguments; the episode URL is the only positional one.
    pub fn build_args(&self, job: &DownloadJob) -> Vec<String> {
        vec![
            "--concurrent-fragments".to_string(),
            self.config.fragments().to_string(),
            "--throttled-rate".to_string(),
            self.config.min_rate.clone(),
            "--output".to_string(),
            job.output_template.clone(),
            job.url.clone(),
        ]
    }

    /// Absolute path of the executable; the tool runs inside the output directory.
    fn resolved_executable(&self) -> Result<PathBuf, DownloadError> {
        let path = self.config.executable_path();
        if path.components().count() == 1 {
            // Bare program name, looked up on PATH
            return Ok(path);
        }
        Ok(std::path::absolute(&path)?)
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn validate(&self) -> Result<(), DownloadError> {
        let path = self.config.executable_path();
        if path.components().count() > 1 {
            if tokio::fs::metadata(&path).await.is_err() {
                return Err(DownloadError::ToolNotFound { path });
            }
        } else if !answers(path.as_os_str(), "--version").await {
            // Bare name, resolved through PATH
            return Err(DownloadError::ToolNotFound { path });
        }

        for program in &self.config.required_programs {
            if !answers(OsStr::new(program), "-version").await {
                return Err(DownloadError::ProgramNotFound {
                    name: program.clone(),
                });
            }
        }

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

        tokio::fs::create_dir_all(&job.output_dir)
            .await
            .map_err(|_| DownloadError::OutputDirectoryFailed {
                path: job.output_dir.clone(),
            })?;

        let executable = self.resolved_executable()?;
        let args = self.build_args(job);
        debug!(executable = %executable.display(), ?args, dir = %job.output_dir.display(), "Running download tool");

        let child = Command::new(&executable)
            .args(&args)
            .current_dir(&job.output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DownloadError::ToolNotFound {
                        path: executable.clone(),
                    }
                } else {
                    DownloadError::Io(e)
                }
            })?;

        // Losing the race drops the child, which kills it
        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
            output = child.wait_with_output() => output?,
        };

        if !output.status.success() {
            let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
            captured.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(DownloadError::tool_failed(
                job.url.clone(),
                output.status.code(),
                tail(&captured, OUTPUT_TAIL_BYTES),
            ));
        }

        Ok(())
    }
}

/// Whether `program <flag>` runs and exits successfully.
async fn answers(program: &OsStr, flag: &str) -> bool {
    Command::new(program)
        .arg(flag)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Last `max` bytes of `text`, cut at a char boundary.
fn tail(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

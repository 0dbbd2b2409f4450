//! yt-dlp based fetcher using the external binary

use super::parser::{PROGRESS_TEMPLATE, parse_probe_output, parse_progress_line, stderr_tail};
use super::traits::{Fetcher, ProgressCallback};
use crate::config::ToolsConfig;
use crate::error::FetchError;
use crate::types::{FetchEvent, VideoMetadata};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Number of stderr lines kept in error messages
const STDERR_TAIL_LINES: usize = 5;

/// Fetcher driving the external `yt-dlp` binary
///
/// Downloads are run with a machine-readable progress template and parsed
/// line by line from stdout. Metadata probes use `yt-dlp -J`.
///
/// # Examples
///
/// ```no_run
/// use vidfetch::fetcher::{Fetcher, YtDlpFetcher};
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let fetcher = YtDlpFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let fetcher = YtDlpFetcher::from_path()
///     .expect("yt-dlp not found in PATH");
/// assert_eq!(fetcher.name(), "yt-dlp");
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    binary_path: PathBuf,
    format: String,
    merge_output_format: String,
    extra_args: Vec<String>,
}

impl YtDlpFetcher {
    /// Create a fetcher with an explicit binary path and default options
    pub fn new(binary_path: PathBuf) -> Self {
        let defaults = ToolsConfig::default();
        Self {
            binary_path,
            format: defaults.format,
            merge_output_format: defaults.merge_output_format,
            extra_args: defaults.extra_args,
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// # Returns
    ///
    /// `Some(YtDlpFetcher)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Apply format and extra-argument settings from the tools config
    pub fn with_options(mut self, tools: &ToolsConfig) -> Self {
        self.format = tools.format.clone();
        self.merge_output_format = tools.merge_output_format.clone();
        self.extra_args = tools.extra_args.clone();
        self
    }

    /// Path of the binary this fetcher runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn download_command(&self, locator: &str, destination: &Path) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("-f")
            .arg(&self.format)
            .arg("--merge-output-format")
            .arg(&self.merge_output_format)
            .arg("-o")
            .arg(destination)
            .arg("--no-playlist")
            .arg("--newline")
            .arg("--quiet")
            .arg("--progress")
            .arg("--progress-template")
            .arg(PROGRESS_TEMPLATE)
            .args(&self.extra_args)
            // Locators starting with '-' must not be read as options
            .arg("--")
            .arg(locator)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, e: std::io::Error) -> FetchError {
        FetchError::Spawn {
            binary: self.binary_path.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        locator: &str,
        destination: &Path,
        on_progress: ProgressCallback,
    ) -> crate::Result<()> {
        let mut child = self
            .download_command(locator, destination)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child.stdout.take().ok_or_else(|| FetchError::Spawn {
            binary: self.binary_path.clone(),
            reason: "stdout was not captured".into(),
        })?;

        // Drain stderr concurrently so a chatty process never blocks on a full pipe
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut buf).await;
            }
            String::from_utf8_lossy(&buf).into_owned()
        });

        let mut lines = BufReader::new(stdout).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(event) = parse_progress_line(&line).and_then(|p| p.to_event()) {
                        on_progress(event);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    // The job is about to be marked failed; the process must not outlive it
                    if let Err(kill_err) = child.kill().await {
                        tracing::warn!(
                            error = %kill_err,
                            "Failed to kill yt-dlp after read error"
                        );
                    }
                    stderr_task.abort();
                    return Err(e.into());
                }
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(FetchError::ProcessFailed {
                status: status.to_string(),
                stderr: stderr_tail(&stderr, STDERR_TAIL_LINES),
            }
            .into());
        }

        on_progress(FetchEvent::Finished);
        Ok(())
    }

    async fn probe(&self, locator: &str) -> crate::Result<VideoMetadata> {
        let output = Command::new(&self.binary_path)
            .arg("-J")
            .arg("--skip-download")
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--")
            .arg(locator)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(FetchError::ProcessFailed {
                status: output.status.to_string(),
                stderr: stderr_tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
            }
            .into());
        }

        Ok(parse_probe_output(&output.stdout)?)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

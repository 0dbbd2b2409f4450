//! Readiness wait and artifact hand-off.

use crate::error::{Error, Result};
use crate::types::{Artifact, Event, HistoryRecord, TaskId};
use std::path::Path;
use std::time::Duration;

use super::VideoFetcher;

impl VideoFetcher {
    /// Hand out the finished artifact of a task
    ///
    /// Once the job is at 100%, polls the output file until it exists and is
    /// at least `readiness.min_file_size` bytes, for at most
    /// `readiness.timeout`. On success the title is looked up (failures only
    /// leave it empty), a history record is appended (failures are only
    /// logged) and the artifact is returned.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `task_id` is empty
    /// - `NotReady` if the job is unknown or below 100% (no side effects)
    /// - `FileNotReady` if the readiness wait times out (nothing is recorded)
    pub async fn retrieve(&self, task_id: &str, locator: &str) -> Result<Artifact> {
        let task_id = TaskId::parse(task_id)?;

        let job = match self.registry.get(&task_id) {
            Some(job) if job.progress >= 100 => job,
            _ => {
                return Err(Error::NotReady {
                    task_id: task_id.to_string(),
                });
            }
        };

        let size_bytes = self.wait_for_file(&job.output_path).await?;
        let title = self.lookup_title(locator).await;
        let filename = job.filename();

        if let Err(e) = self
            .ledger
            .append(HistoryRecord::new(title.clone(), filename.clone(), size_bytes))
            .await
        {
            tracing::error!(task_id = %task_id, error = %e, "Failed to record download history");
        }

        tracing::info!(
            task_id = %task_id,
            filename = %filename,
            size_bytes,
            "Artifact retrieved"
        );
        self.event_tx
            .send(Event::Retrieved {
                task_id: task_id.clone(),
                filename,
                size_bytes,
            })
            .ok();

        Ok(Artifact {
            task_id,
            path: job.output_path,
            display_filename: self.config.download.display_filename.clone(),
            size_bytes,
            title,
        })
    }

    /// Poll `path` until it holds a plausibly complete file
    ///
    /// Returns the file size on success.
    pub(crate) async fn wait_for_file(&self, path: &Path) -> Result<u64> {
        let readiness = &self.config.download.readiness;
        let mut waited = Duration::ZERO;
        let mut last_size = None;

        loop {
            if let Ok(meta) = tokio::fs::metadata(path).await
                && meta.is_file()
            {
                let size = meta.len();
                if size >= readiness.min_file_size {
                    return Ok(size);
                }
                last_size = Some(size);
            }

            if waited >= readiness.timeout {
                break;
            }

            tokio::time::sleep(readiness.poll_interval).await;
            waited += readiness.poll_interval;
        }

        tracing::warn!(
            path = %path.display(),
            last_size = ?last_size,
            waited_ms = waited.as_millis() as u64,
            "Output file not ready"
        );
        Err(Error::FileNotReady {
            path: path.to_path_buf(),
            last_size,
        })
    }

    /// Best-effort title lookup; any failure yields an empty title
    async fn lookup_title(&self, locator: &str) -> String {
        if locator.trim().is_empty() {
            return String::new();
        }

        match self.fetcher.probe(locator).await {
            Ok(meta) => meta.title.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Metadata lookup failed, recording empty title");
                String::new()
            }
        }
    }
}

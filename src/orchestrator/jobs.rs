//! Job creation, idempotent attach and progress translation.

use crate::error::{Error, Result};
use crate::fetcher::ProgressCallback;
use crate::registry::ProgressUpdate;
use crate::types::{Event, FetchEvent, Job, StartedJob, TaskId, VideoMetadata};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::{ActiveFetch, VideoFetcher};

impl VideoFetcher {
    /// Start a fetch for `task_id`, or attach to the one already registered
    ///
    /// Returns as soon as the fetch is scheduled; the transfer itself runs on
    /// the worker pool. Calling this again for the same task (whether the
    /// fetch is running, finished or failed) returns the original filename and
    /// never launches a second fetch.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `task_id` or `locator` is empty
    /// - `ShuttingDown` if a new job would have to be created during shutdown
    pub async fn start_or_attach(&self, task_id: &str, locator: &str) -> Result<StartedJob> {
        let task_id = TaskId::parse(task_id)?;
        if locator.trim().is_empty() {
            return Err(Error::InvalidRequest("missing url".into()));
        }

        if let Some(job) = self.registry.get(&task_id) {
            tracing::debug!(
                task_id = %task_id,
                progress = job.progress,
                "Attached to existing job"
            );
            return Ok(attached(job));
        }

        if !self.workers.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let (job, created) = self
            .registry
            .get_or_create(&task_id, || self.new_output_path());

        // Lost the race against a concurrent caller with the same id
        if !created {
            return Ok(attached(job));
        }

        let filename = job.filename();
        tracing::info!(
            task_id = %task_id,
            filename = %filename,
            fetcher = self.fetcher.name(),
            "Starting fetch"
        );
        self.event_tx
            .send(Event::JobCreated {
                task_id: task_id.clone(),
                filename: filename.clone(),
            })
            .ok();

        self.launch(&job, locator.to_string()).await;

        Ok(StartedJob {
            task_id,
            filename,
            attached: false,
        })
    }

    /// Progress of a task (0 for unknown or invalid ids)
    pub fn get_progress(&self, task_id: &str) -> u8 {
        match TaskId::parse(task_id) {
            Ok(task_id) => self.registry.get_progress(&task_id),
            Err(_) => 0,
        }
    }

    /// Read descriptive metadata for a locator without downloading it
    pub async fn probe(&self, locator: &str) -> Result<VideoMetadata> {
        if locator.trim().is_empty() {
            return Err(Error::InvalidRequest("missing url".into()));
        }
        self.fetcher.probe(locator).await
    }

    /// Fresh, unique artifact path inside the download directory
    fn new_output_path(&self) -> PathBuf {
        self.config.download_dir().join(format!(
            "{}.{}",
            uuid::Uuid::new_v4(),
            self.config.tools.merge_output_format
        ))
    }

    /// Build the callback translating fetch events into registry updates
    pub(crate) fn progress_callback(&self, task_id: TaskId) -> ProgressCallback {
        let registry = self.registry.clone();
        let event_tx = self.event_tx.clone();

        Arc::new(move |event: FetchEvent| match event {
            FetchEvent::Downloading { .. } => {
                if let ProgressUpdate::Advanced(percent) =
                    registry.update_progress(&task_id, event.percent())
                {
                    event_tx
                        .send(Event::Progress {
                            task_id: task_id.clone(),
                            percent,
                        })
                        .ok();
                }
            }
            FetchEvent::Finished => {
                let before = registry.get_progress(&task_id);
                if registry.mark_complete(&task_id) {
                    if before < 100 {
                        event_tx
                            .send(Event::Progress {
                                task_id: task_id.clone(),
                                percent: 100,
                            })
                            .ok();
                    }
                    event_tx
                        .send(Event::FetchComplete {
                            task_id: task_id.clone(),
                        })
                        .ok();
                }
            }
        })
    }

    /// Spawn the fetch for a freshly created job onto the worker pool
    ///
    /// The supervising task waits for a pool permit, runs the fetch in its own
    /// task so a panic is contained, records any failure on the job and
    /// finally removes itself from the active map.
    async fn launch(&self, job: &Job, locator: String) {
        let task_id = job.task_id.clone();
        let destination = job.output_path.clone();
        let fetcher = self.fetcher.clone();
        let registry = self.registry.clone();
        let event_tx = self.event_tx.clone();
        let limit = self.workers.concurrent_limit.clone();
        let active_fetches = self.workers.active_fetches.clone();
        let on_progress = self.progress_callback(task_id.clone());
        let seq = self.workers.next_seq.fetch_add(1, Ordering::SeqCst);

        // Held across spawn + insert so the task cannot remove its entry first
        let mut active = self.workers.active_fetches.lock().await;

        let supervised_id = task_id.clone();
        let handle = tokio::spawn(async move {
            let task_id = supervised_id;
            let _permit = match limit.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(task_id = %task_id, error = %e, "Worker pool closed");
                    return;
                }
            };

            tracing::debug!(task_id = %task_id, "Fetch acquired worker slot");

            let outcome = tokio::spawn(async move {
                fetcher.fetch(&locator, &destination, on_progress).await
            })
            .await;

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(join_error) => Some(format!("fetch task aborted: {join_error}")),
            };

            match failure {
                None => tracing::info!(task_id = %task_id, "Fetch finished"),
                Some(error) => {
                    tracing::error!(task_id = %task_id, error = %error, "Fetch failed");
                    registry.mark_failed(&task_id, error.clone());
                    event_tx
                        .send(Event::FetchFailed {
                            task_id: task_id.clone(),
                            error,
                        })
                        .ok();
                }
            }

            let mut active = active_fetches.lock().await;
            if active.get(&task_id).is_some_and(|entry| entry.seq == seq) {
                active.remove(&task_id);
            }
        });

        active.insert(task_id, ActiveFetch { seq, handle });
    }
}

fn attached(job: Job) -> StartedJob {
    StartedJob {
        filename: job.filename(),
        task_id: job.task_id,
        attached: true,
    }
}

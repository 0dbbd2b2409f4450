//! Job orchestrator split into focused submodules.
//!
//! The `VideoFetcher` struct and its methods are organized by concern:
//! - [`jobs`] - Job creation, idempotent attach, progress translation
//! - [`retrieve`] - Readiness wait and artifact hand-off
//! - [`lifecycle`] - Shutdown and job eviction

mod jobs;
mod lifecycle;
mod retrieve;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{self, Fetcher};
use crate::history::{HistoryLedger, HistoryListing};
use crate::registry::JobRegistry;
use crate::types::{Event, Job, TaskId};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};

/// A spawned fetch whose handle is retained until it finishes
pub(crate) struct ActiveFetch {
    /// Launch sequence number, so a finishing task only removes its own entry
    pub(crate) seq: u64,
    /// Handle of the supervising task (kept for shutdown and future cancellation)
    pub(crate) handle: tokio::task::JoinHandle<()>,
}

/// Worker pool state shared by all launched fetches
#[derive(Clone)]
pub(crate) struct WorkerPool {
    /// Semaphore bounding concurrent transfers (max_concurrent_fetches permits)
    pub(crate) concurrent_limit: Arc<tokio::sync::Semaphore>,
    /// Fetches that have been launched and not yet finished
    pub(crate) active_fetches: Arc<tokio::sync::Mutex<HashMap<TaskId, ActiveFetch>>>,
    /// Monotonic launch counter
    pub(crate) next_seq: Arc<AtomicU64>,
    /// Flag to indicate whether new jobs are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl WorkerPool {
    pub(crate) fn new(max_concurrent: usize) -> Self {
        Self {
            concurrent_limit: Arc::new(tokio::sync::Semaphore::new(max_concurrent)),
            active_fetches: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
            accepting_new: Arc::new(AtomicBool::new(true)),
        }
    }
}

/// Main orchestrator instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct VideoFetcher {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Job state, written by progress callbacks and read by queries
    pub(crate) registry: Arc<JobRegistry>,
    /// Durable history of retrieved artifacts
    pub(crate) ledger: Arc<HistoryLedger>,
    /// Media fetch engine (trait object for pluggable implementations)
    pub(crate) fetcher: Arc<dyn Fetcher>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Fetch task bookkeeping
    pub(crate) workers: WorkerPool,
}

impl VideoFetcher {
    /// Create a new VideoFetcher instance
    ///
    /// This initializes all core components:
    /// - Creates the download directory
    /// - Selects the fetch engine (yt-dlp if available, otherwise a no-op stub)
    /// - Opens the history ledger
    /// - Sets up the event broadcast channel
    pub async fn new(config: Config) -> Result<Self> {
        let fetcher = fetcher::from_config(&config.tools);
        Self::with_fetcher(config, fetcher).await
    }

    /// Create a VideoFetcher driving a caller-supplied fetch engine
    pub async fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(config.download_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download_dir().display(),
                        e
                    ),
                ))
            })?;

        tracing::info!(
            fetcher = fetcher.name(),
            download_dir = %config.download_dir().display(),
            history = %config.persistence.history_path.display(),
            max_concurrent = config.download.max_concurrent_fetches,
            "Video fetcher initialized"
        );

        // Buffer of 1000 events so slow subscribers only lose old progress updates
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let ledger = Arc::new(HistoryLedger::new(config.persistence.history_path.clone()));
        let workers = WorkerPool::new(config.download.max_concurrent_fetches);

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(JobRegistry::new()),
            ledger,
            fetcher,
            event_tx,
            workers,
        })
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Name of the fetch engine in use
    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }

    /// Snapshot of a job, if it exists
    pub fn job(&self, task_id: &str) -> Option<Job> {
        let task_id = TaskId::parse(task_id).ok()?;
        self.registry.get(&task_id)
    }

    /// Number of jobs held in memory
    pub fn job_count(&self) -> usize {
        self.registry.len()
    }

    /// Download history, newest first (never fails; see [`HistoryListing::error`])
    pub async fn history(&self) -> HistoryListing {
        self.ledger.list().await
    }

    /// Spawn the API server in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let fetcher = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(fetcher, config).await })
    }
}

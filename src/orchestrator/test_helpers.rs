//! Shared test helpers for creating VideoFetcher instances in tests.

use crate::config::Config;
use crate::error::{Error, FetchError, Result};
use crate::fetcher::{Fetcher, ProgressCallback};
use crate::orchestrator::VideoFetcher;
use crate::types::{FetchEvent, VideoMetadata};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::Notify;

/// Fetch engine replaying a fixed script of events
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    /// Events forwarded to the progress callback, in order
    pub events: Vec<FetchEvent>,
    /// Bytes written to the destination before the events are replayed
    pub write_bytes: Option<usize>,
    /// Fail the fetch with this stderr after replaying the events
    pub fail_with: Option<String>,
    /// Panic instead of returning
    pub panic: bool,
    /// Wait for this notification before replaying anything
    pub gate: Option<Arc<Notify>>,
    /// Title reported by `probe` (None makes probe fail)
    pub title: Option<String>,
    /// Number of `fetch` calls
    pub fetch_calls: AtomicUsize,
    /// Number of `probe` calls
    pub probe_calls: AtomicUsize,
    /// Number of fetches currently inside `fetch`
    pub in_flight: AtomicUsize,
    /// Highest value `in_flight` reached
    pub peak_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    /// A fetch that writes `bytes` and reports a clean 0/50/100 run
    pub fn completing(bytes: usize) -> Self {
        Self {
            events: vec![
                downloading(0, bytes as u64),
                downloading(bytes as u64 / 2, bytes as u64),
                downloading(bytes as u64, bytes as u64),
                FetchEvent::Finished,
            ],
            write_bytes: Some(bytes),
            title: Some("Test Video".to_string()),
            ..Default::default()
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

pub(crate) fn downloading(downloaded_bytes: u64, total_bytes: u64) -> FetchEvent {
    FetchEvent::Downloading {
        downloaded_bytes,
        total_bytes: Some(total_bytes),
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        _locator: &str,
        destination: &Path,
        on_progress: ProgressCallback,
    ) -> Result<()> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if let Some(bytes) = self.write_bytes {
            tokio::fs::write(destination, vec![0u8; bytes]).await?;
        }

        for event in &self.events {
            on_progress(*event);
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic {
            panic!("scripted fetch panic");
        }

        match &self.fail_with {
            Some(stderr) => Err(FetchError::ProcessFailed {
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }

    async fn probe(&self, _locator: &str) -> Result<VideoMetadata> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        match &self.title {
            Some(title) => Ok(VideoMetadata {
                title: Some(title.clone()),
                ..Default::default()
            }),
            None => Err(Error::Fetch(FetchError::InvalidMetadata(
                "scripted probe failure".to_string(),
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Config rooted in `dir` with a fast readiness wait
pub(crate) fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.download.download_dir = dir.join("downloads");
    config.persistence.history_path = dir.join("download_history.json");
    config.download.readiness.poll_interval = Duration::from_millis(10);
    config.download.readiness.timeout = Duration::from_millis(200);
    config.server.api.shutdown_timeout = Duration::from_secs(2);
    config
}

/// Helper to create a test VideoFetcher driving `fetcher`.
/// Returns the orchestrator and the tempdir (which must be kept alive).
pub(crate) async fn create_test_fetcher(
    fetcher: Arc<ScriptedFetcher>,
) -> (VideoFetcher, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(temp_dir.path());
    let orchestrator = VideoFetcher::with_fetcher(config, fetcher).await.unwrap();
    (orchestrator, temp_dir)
}

/// Poll `condition` until it holds, panicking after two seconds
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within 2s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Wait until every launched fetch has finished
pub(crate) async fn wait_for_idle(orchestrator: &VideoFetcher) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while orchestrator.active_fetch_count().await > 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "fetches still active after 2s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

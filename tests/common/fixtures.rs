//! Test fixtures: a stub fetch engine and config helpers

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use vidfetch::{Config, FetchEvent, Fetcher, ProgressCallback, VideoFetcher, VideoMetadata};

/// Fetch engine writing `size` bytes in `chunks` progress steps
pub struct StubFetcher {
    pub size: u64,
    pub chunks: u64,
    pub step_delay: Duration,
    pub title: String,
    pub calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new(size: u64, chunks: u64) -> Self {
        Self {
            size,
            chunks,
            step_delay: Duration::from_millis(5),
            title: "Stub Video".to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(
        &self,
        _locator: &str,
        destination: &Path,
        on_progress: ProgressCallback,
    ) -> vidfetch::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        for step in 1..=self.chunks {
            tokio::time::sleep(self.step_delay).await;
            on_progress(FetchEvent::Downloading {
                downloaded_bytes: self.size * step / self.chunks,
                total_bytes: Some(self.size),
            });
        }

        tokio::fs::write(destination, vec![7u8; self.size as usize]).await?;
        on_progress(FetchEvent::Finished);
        Ok(())
    }

    async fn probe(&self, _locator: &str) -> vidfetch::Result<VideoMetadata> {
        Ok(VideoMetadata {
            title: Some(self.title.clone()),
            ..Default::default()
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Config rooted in a fresh temp dir with a fast readiness wait
pub fn test_config() -> (Config, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.persistence.history_path = temp_dir.path().join("download_history.json");
    config.download.readiness.poll_interval = Duration::from_millis(10);
    config.download.readiness.timeout = Duration::from_millis(500);
    (config, temp_dir)
}

/// Orchestrator driving `fetcher`, plus the temp dir holding its files
pub async fn create_stub_orchestrator(fetcher: Arc<StubFetcher>) -> (Arc<VideoFetcher>, TempDir) {
    let (config, temp_dir) = test_config();
    let orchestrator = VideoFetcher::with_fetcher(config, fetcher).await.unwrap();
    (Arc::new(orchestrator), temp_dir)
}

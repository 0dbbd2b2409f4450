//! No-op fetcher for graceful degradation

use super::traits::{Fetcher, ProgressCallback};
use crate::types::VideoMetadata;
use async_trait::async_trait;
use std::path::Path;

/// Fetcher used when no yt-dlp binary is available or configured
///
/// Every call fails with `Error::NotSupported`, so the service still starts
/// and answers progress and history queries.
///
/// # Examples
///
/// ```
/// use vidfetch::fetcher::{Fetcher, NoOpFetcher};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let fetcher = NoOpFetcher;
/// let result = fetcher
///     .fetch("https://example.com/v", Path::new("out.mp4"), Arc::new(|_| {}))
///     .await;
/// assert!(result.is_err());
/// # }
/// ```
pub struct NoOpFetcher;

const UNAVAILABLE: &str = "fetching requires the yt-dlp binary. \
     Configure ytdlp_path in config or ensure yt-dlp is in PATH.";

#[async_trait]
impl Fetcher for NoOpFetcher {
    async fn fetch(
        &self,
        _locator: &str,
        _destination: &Path,
        _on_progress: ProgressCallback,
    ) -> crate::Result<()> {
        Err(crate::Error::NotSupported(UNAVAILABLE.into()))
    }

    async fn probe(&self, _locator: &str) -> crate::Result<VideoMetadata> {
        Err(crate::Error::NotSupported(UNAVAILABLE.into()))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn probe_is_not_supported() {
        let result = NoOpFetcher.probe("https://example.com/v").await;
        assert!(matches!(result, Err(crate::Error::NotSupported(_))));
    }

    #[tokio::test]
    async fn fetch_never_reports_progress() {
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = called.clone();

        let result = NoOpFetcher
            .fetch(
                "https://example.com/v",
                Path::new("out.mp4"),
                Arc::new(move |_| flag.store(true, std::sync::atomic::Ordering::SeqCst)),
            )
            .await;

        assert!(result.is_err());
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn name_is_noop() {
        assert_eq!(NoOpFetcher.name(), "noop");
    }
}

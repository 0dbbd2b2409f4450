//! Traits and types for media fetching

use crate::types::{FetchEvent, VideoMetadata};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Callback receiving progress events from a running fetch
///
/// Invoked from the fetch's worker task; implementations must not block.
pub type ProgressCallback = Arc<dyn Fn(FetchEvent) + Send + Sync>;

/// Trait for media retrieval engines
///
/// This trait defines the interface the orchestrator drives. Implementations
/// can wrap external binaries, pure Rust clients, or stubs for tests.
///
/// # Examples
///
/// ```no_run
/// use vidfetch::fetcher::{Fetcher, YtDlpFetcher};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = YtDlpFetcher::from_path()
///     .expect("yt-dlp binary not found");
///
/// let meta = fetcher.probe("https://example.com/watch?v=abc").await?;
/// println!("title: {:?}", meta.title);
///
/// fetcher
///     .fetch(
///         "https://example.com/watch?v=abc",
///         Path::new("downloads/abc.mp4"),
///         Arc::new(|event| println!("{event:?}")),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Transfer `locator` into `destination`
    ///
    /// Calls `on_progress` with zero or more [`FetchEvent::Downloading`]
    /// events and, on success, exactly one [`FetchEvent::Finished`] before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer cannot be started or fails
    /// (network error, invalid locator, unsupported source).
    async fn fetch(
        &self,
        locator: &str,
        destination: &Path,
        on_progress: ProgressCallback,
    ) -> crate::Result<()>;

    /// Read descriptive metadata without transferring the media
    async fn probe(&self, locator: &str) -> crate::Result<VideoMetadata>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

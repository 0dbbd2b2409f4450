//! # vidfetch
//!
//! Background video downloads with progress polling, a readiness check before
//! hand-off and a durable download history.
//!
//! ## Overview
//!
//! - **Jobs are keyed by client-chosen task ids** - starting the same task
//!   twice attaches to the running job instead of launching a second fetch
//! - **Fetching is pluggable** - [`YtDlpFetcher`] drives the `yt-dlp` CLI;
//!   any [`Fetcher`] implementation can be supplied instead
//! - **Event-driven** - consumers subscribe to [`Event`]s, or poll progress
//! - **Library-first** - the HTTP surface in [`api`] is optional
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidfetch::{Config, VideoFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = VideoFetcher::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = fetcher.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let started = fetcher
//!         .start_or_attach("task-1", "https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     println!("writing {}", started.filename);
//!
//!     while fetcher.get_progress("task-1") < 100 {
//!         tokio::time::sleep(std::time::Duration::from_millis(500)).await;
//!     }
//!
//!     let artifact = fetcher.retrieve("task-1", "").await?;
//!     println!("ready: {} ({} bytes)", artifact.path.display(), artifact.size_bytes);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Media fetch engines
pub mod fetcher;
/// Durable download history
pub mod history;
/// Job orchestration (decomposed into focused submodules)
pub mod orchestrator;
/// In-memory job state
pub mod registry;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Error, FetchError, LedgerError, Result, ToErrorCode};
pub use fetcher::{Fetcher, NoOpFetcher, ProgressCallback, YtDlpFetcher};
pub use history::{HistoryLedger, HistoryListing};
pub use orchestrator::VideoFetcher;
pub use registry::JobRegistry;
pub use types::{
    Artifact, Event, FetchEvent, HistoryRecord, Job, JobPhase, StartedJob, TaskId, VideoMetadata,
};

/// Helper function to run the orchestrator with graceful signal handling.
///
/// Waits for a termination signal and then calls [`VideoFetcher::shutdown`].
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use vidfetch::{VideoFetcher, Config, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = Arc::new(VideoFetcher::new(Config::default()).await?);
///     let _api = fetcher.spawn_api_server();
///
///     // Run with automatic signal handling
///     run_with_shutdown(&fetcher).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(fetcher: &VideoFetcher) -> Result<()> {
    wait_for_signal().await;
    fetcher.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // A handler that cannot be registered never fires; the other one still can
    let listen = |kind: SignalKind, name: &'static str| async move {
        match signal(kind) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!(signal = name, "Received shutdown signal");
            }
            Err(e) => {
                tracing::warn!(signal = name, error = %e, "Could not register signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = listen(SignalKind::terminate(), "SIGTERM") => {}
        _ = listen(SignalKind::interrupt(), "SIGINT") => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C");
}

//! Media fetch engine adapters
//!
//! The orchestrator talks to the fetch engine only through the [`Fetcher`]
//! trait. Two implementations are provided:
//!
//! - [`YtDlpFetcher`]: drives the external `yt-dlp` binary
//! - [`NoOpFetcher`]: stub used when no binary is available
//!
//! ## Usage
//!
//! ```no_run
//! use vidfetch::fetcher::{Fetcher, YtDlpFetcher};
//! use vidfetch::types::FetchEvent;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = YtDlpFetcher::from_path().expect("yt-dlp binary not found");
//!
//!     fetcher
//!         .fetch(
//!             "https://example.com/watch?v=abc",
//!             Path::new("downloads/abc.mp4"),
//!             Arc::new(|event| {
//!                 println!("{}%", event.percent());
//!                 if event == FetchEvent::Finished {
//!                     println!("done");
//!                 }
//!             }),
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
pub mod parser;
mod traits;

pub use cli::YtDlpFetcher;
pub use noop::NoOpFetcher;
pub use traits::{Fetcher, ProgressCallback};

use crate::config::ToolsConfig;
use std::sync::Arc;

/// Pick the fetcher implementation for a tools configuration
///
/// An explicit `ytdlp_path` wins; otherwise PATH is searched if allowed.
/// Falls back to [`NoOpFetcher`] when no binary is found.
pub fn from_config(tools: &ToolsConfig) -> Arc<dyn Fetcher> {
    let found = match tools.ytdlp_path {
        Some(ref path) => Some(YtDlpFetcher::new(path.clone())),
        None if tools.search_path => YtDlpFetcher::from_path(),
        None => None,
    };

    match found {
        Some(fetcher) => {
            tracing::debug!(binary = %fetcher.binary_path().display(), "Using yt-dlp");
            Arc::new(fetcher.with_options(tools))
        }
        None => {
            tracing::warn!("yt-dlp not available, downloads are disabled");
            Arc::new(NoOpFetcher)
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn explicit_path_selects_ytdlp() {
        let tools = ToolsConfig {
            ytdlp_path: Some(PathBuf::from("/opt/yt-dlp")),
            ..ToolsConfig::default()
        };
        assert_eq!(from_config(&tools).name(), "yt-dlp");
    }

    #[test]
    fn disabled_search_without_path_selects_noop() {
        let tools = ToolsConfig {
            ytdlp_path: None,
            search_path: false,
            ..ToolsConfig::default()
        };
        assert_eq!(from_config(&tools).name(), "noop");
    }

    #[test]
    fn path_search_matches_which() {
        let tools = ToolsConfig::default();
        let expected = if which::which("yt-dlp").is_ok() {
            "yt-dlp"
        } else {
            "noop"
        };
        assert_eq!(from_config(&tools).name(), expected);
    }
}

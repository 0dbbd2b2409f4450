//! Application state for the API server

use crate::{Config, VideoFetcher};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The orchestrator handling jobs and history
    pub fetcher: Arc<VideoFetcher>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(fetcher: Arc<VideoFetcher>, config: Arc<Config>) -> Self {
        Self { fetcher, config }
    }
}

//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`video`] - Metadata lookup, download start/attach/retrieve, progress
//! - [`history`] - Retrieved download history
//! - [`system`] - Health, events, OpenAPI

use crate::types::{HistoryRecord, TaskId, VideoMetadata};
use serde::{Deserialize, Serialize};

mod history;
mod system;
mod video;

// Re-export all handlers so `routes::function_name` continues to work
pub use history::*;
pub use system::*;
pub use video::*;

// ============================================================================
// Query Types
// ============================================================================

/// Query parameters for GET /api/parse
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParseQuery {
    /// Video page URL
    pub url: Option<String>,
}

/// Query parameters for GET /api/download
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Video page URL (needed to start a job; used for the title on retrieval)
    pub url: Option<String>,
    /// Client-chosen task identifier
    pub task_id: Option<String>,
}

/// Query parameters for GET /api/progress
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProgressQuery {
    /// Client-chosen task identifier
    pub task_id: Option<String>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Response for GET /api/parse
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ParseResponse {
    /// Always `true`
    pub success: bool,
    /// Video metadata
    pub data: VideoMetadata,
}

/// Response for GET /api/download when a job was started or attached to
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DownloadStartedResponse {
    /// Always `true`
    pub success: bool,
    /// Task identifier
    pub task_id: TaskId,
    /// File the job writes into the download directory
    pub filename: String,
}

/// Response for GET /api/progress
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProgressResponse {
    /// Percentage 0..=100
    pub progress: u8,
}

/// Response for GET /api/history
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HistoryResponse {
    /// False if the history file could not be read
    pub success: bool,
    /// Records, newest first (empty on failure)
    pub data: Vec<HistoryRecord>,
    /// Read failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response for GET /api/health
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
    /// Crate version
    pub version: String,
    /// Active fetch engine
    pub fetcher: String,
}

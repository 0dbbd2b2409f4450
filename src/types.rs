//! Core types for vidfetch

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Client-chosen identifier correlating a fetch request with later queries
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a TaskId, rejecting empty or whitespace-only input
    pub fn parse(raw: impl Into<String>) -> crate::Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(crate::Error::InvalidRequest("missing task_id".into()));
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle phase of a job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Created, no progress reported yet
    New,
    /// Transfer running (0–99%)
    InProgress,
    /// Transfer finished (100%)
    Complete,
}

/// Snapshot of a job held by the registry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Task identifier
    pub task_id: TaskId,
    /// Progress percentage (0–100, never decreases)
    pub progress: u8,
    /// Where the fetcher writes the artifact (fixed at creation)
    #[schema(value_type = String)]
    pub output_path: PathBuf,
    /// Set once the fetcher reported its terminal "finished" event
    pub completed: bool,
    /// Last fetch failure, if any (progress is left where it stopped)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Creation time (Unix timestamp)
    pub created_at: i64,
    /// Completion time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl Job {
    /// File name component of the output path
    pub fn filename(&self) -> String {
        self.output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> JobPhase {
        if self.completed || self.progress >= 100 {
            JobPhase::Complete
        } else if self.progress == 0 {
            JobPhase::New
        } else {
            JobPhase::InProgress
        }
    }
}

/// Result of [`VideoFetcher::start_or_attach`](crate::VideoFetcher::start_or_attach)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StartedJob {
    /// Task identifier
    pub task_id: TaskId,
    /// Name of the file the job writes into the download directory
    pub filename: String,
    /// True if the call joined an existing job instead of starting one
    #[serde(skip)]
    pub attached: bool,
}

/// A finished artifact ready to be served
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Task identifier
    pub task_id: TaskId,
    /// Location on disk
    pub path: PathBuf,
    /// Filename suggested to the client
    pub display_filename: String,
    /// Size observed by the readiness wait
    pub size_bytes: u64,
    /// Title from the best-effort metadata lookup (empty when unavailable)
    pub title: String,
}

/// Descriptive metadata about a remote video
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VideoMetadata {
    /// Thumbnail URL
    pub thumbnail: Option<String>,
    /// Video title
    pub title: Option<String>,
    /// Video description
    pub description: Option<String>,
    /// Upload date as reported by the source (usually YYYYMMDD)
    pub upload_date: Option<String>,
    /// Exact size if known, otherwise the approximate size
    pub size_bytes: Option<u64>,
}

/// Progress report emitted by a fetcher
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum FetchEvent {
    /// Transfer in progress
    Downloading {
        /// Bytes received so far
        downloaded_bytes: u64,
        /// Expected total (exact or estimated), if known
        total_bytes: Option<u64>,
    },
    /// Transfer and any post-processing finished successfully (emitted once)
    Finished,
}

impl FetchEvent {
    /// Percentage implied by this event
    ///
    /// A missing or zero total counts as one byte, and the result is clamped
    /// to `0..=100`.
    pub fn percent(&self) -> u8 {
        match *self {
            FetchEvent::Finished => 100,
            FetchEvent::Downloading {
                downloaded_bytes,
                total_bytes,
            } => {
                let total = total_bytes.filter(|t| *t > 0).unwrap_or(1);
                let percent = (downloaded_bytes as u128 * 100) / total as u128;
                percent.min(100) as u8
            }
        }
    }
}

/// A completed, retrieved download recorded in the history ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HistoryRecord {
    /// Video title (empty if the metadata lookup failed)
    pub title: String,
    /// Artifact file name
    pub filename: String,
    /// Artifact size in bytes
    pub size_bytes: u64,
    /// Local time of retrieval, formatted `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
}

impl HistoryRecord {
    /// Timestamp format used in the ledger file
    pub const TIMESTAMP_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// Create a record stamped with the current local time
    pub fn new(title: impl Into<String>, filename: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            title: title.into(),
            filename: filename.into(),
            size_bytes,
            timestamp: chrono::Local::now()
                .format(Self::TIMESTAMP_FORMAT)
                .to_string(),
        }
    }
}

/// Events emitted by the orchestrator
///
/// Consumers can subscribe to these events via
/// [`VideoFetcher::subscribe`](crate::VideoFetcher::subscribe).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new job was registered and its fetch scheduled
    JobCreated {
        /// Task identifier
        task_id: TaskId,
        /// Assigned output file name
        filename: String,
    },

    /// Job progress advanced
    Progress {
        /// Task identifier
        task_id: TaskId,
        /// New percentage
        percent: u8,
    },

    /// Fetcher reported completion
    FetchComplete {
        /// Task identifier
        task_id: TaskId,
    },

    /// Fetch failed; the job stays incomplete
    FetchFailed {
        /// Task identifier
        task_id: TaskId,
        /// Error message
        error: String,
    },

    /// Artifact was served and recorded in history
    Retrieved {
        /// Task identifier
        task_id: TaskId,
        /// Artifact file name
        filename: String,
        /// Artifact size in bytes
        size_bytes: u64,
    },

    /// Service is shutting down
    Shutdown,
}

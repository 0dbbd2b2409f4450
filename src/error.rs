//! Error types for vidfetch
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Fetch, Ledger)
//! - Machine-readable error codes for API integration
//! - The structured failure payload returned to HTTP clients

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for vidfetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vidfetch
///
/// This is the primary error type used throughout the library. Client-facing
/// variants (`InvalidRequest`, `NotReady`, `FileNotReady`) carry the exact
/// message shown to API clients.
#[derive(Debug, Error)]
pub enum Error {
    /// A required request parameter is missing or empty
    #[error("{0}")]
    InvalidRequest(String),

    /// The job has not reached 100% yet (or is unknown)
    #[error("task {task_id} is not ready")]
    NotReady {
        /// Task whose artifact was requested too early
        task_id: String,
    },

    /// The readiness wait elapsed without a plausible output file
    #[error("file not ready")]
    FileNotReady {
        /// Output path that never became ready
        path: PathBuf,
        /// Size observed on the last poll (None if the file never appeared)
        last_size: Option<u64>,
    },

    /// Media fetch engine error
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// History ledger error
    #[error("history error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress - not accepting new jobs
    #[error("shutdown in progress: not accepting new jobs")]
    ShuttingDown,

    /// Operation not supported (missing binary, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Errors raised by the fetcher adapter
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetch executable could not be found
    #[error("fetch binary not found: {0}")]
    BinaryNotFound(String),

    /// The fetch process could not be started
    #[error("failed to start {binary}: {reason}")]
    Spawn {
        /// Binary that failed to start
        binary: PathBuf,
        /// Underlying OS error
        reason: String,
    },

    /// The fetch process exited unsuccessfully
    #[error("fetch process exited with {status}: {stderr}")]
    ProcessFailed {
        /// Exit status description (e.g. "exit status: 1")
        status: String,
        /// Trailing stderr output from the process
        stderr: String,
    },

    /// Metadata output could not be interpreted
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
}

/// Errors raised by the history ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Ledger file exists but could not be read
    #[error("failed to read {path}: {reason}")]
    Read {
        /// Ledger file path
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// Ledger file could not be written
    #[error("failed to write {path}: {reason}")]
    Write {
        /// Ledger file path
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// Ledger file is not a valid record sequence
    #[error("corrupt history file {path}: {reason}")]
    Corrupt {
        /// Ledger file path
        path: PathBuf,
        /// Parser message
        reason: String,
    },
}

/// Structured failure payload returned by every API endpoint
///
/// Failures are reported in-band with HTTP 200 so clients can treat
/// `success` as the single source of truth.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "success": false,
///   "error": "file not ready",
///   "code": "file_not_ready"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Always `false`
    pub success: bool,

    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code (e.g., "invalid_request", "not_ready")
    pub code: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create an "internal error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Map errors to machine-readable codes for API responses
pub trait ToErrorCode {
    /// Get the machine-readable error code
    fn error_code(&self) -> &str;

    /// Whether the client is expected to retry (poll) later
    fn is_retryable(&self) -> bool;
}

impl ToErrorCode for Error {
    fn error_code(&self) -> &str {
        match self {
            Error::InvalidRequest(_) => "invalid_request",
            Error::NotReady { .. } => "not_ready",
            Error::FileNotReady { .. } => "file_not_ready",
            Error::Fetch(e) => match e {
                FetchError::BinaryNotFound(_) => "fetch_binary_not_found",
                FetchError::Spawn { .. } => "fetch_spawn_failed",
                FetchError::ProcessFailed { .. } => "fetch_failed",
                FetchError::InvalidMetadata(_) => "invalid_metadata",
            },
            Error::Ledger(e) => match e {
                LedgerError::Read { .. } => "history_read_failed",
                LedgerError::Write { .. } => "history_write_failed",
                LedgerError::Corrupt { .. } => "history_corrupt",
            },
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
            Error::NotSupported(_) => "not_supported",
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Error::NotReady { .. } | Error::FileNotReady { .. })
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::NotReady { task_id } => Some(serde_json::json!({
                "task_id": task_id,
            })),
            Error::FileNotReady { last_size, .. } => Some(serde_json::json!({
                "last_size": last_size,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            success: false,
            error: message,
            code,
            details,
        }
    }
}

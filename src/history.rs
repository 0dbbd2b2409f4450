//! Durable history ledger
//!
//! A single JSON array of [`HistoryRecord`]s, newest first. Every append
//! reads the whole file, prepends the record and rewrites the file. Appends
//! are serialized through an async mutex so simultaneous completions cannot
//! drop each other's records.

use crate::error::{LedgerError, Result};
use crate::types::HistoryRecord;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Result of [`HistoryLedger::list`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryListing {
    /// Records, newest first (empty when the file is missing or unreadable)
    pub records: Vec<HistoryRecord>,
    /// Set when the file exists but could not be read or parsed
    pub error: Option<String>,
}

impl HistoryListing {
    /// Whether the listing was read cleanly
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Append-to-front ledger of retrieved downloads
#[derive(Debug)]
pub struct HistoryLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryLedger {
    /// Create a ledger backed by `path` (the file is created on first append)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prepend a record and rewrite the file
    ///
    /// An unreadable or corrupt existing file is treated as empty (and logged);
    /// only a failed write is returned as an error.
    pub async fn append(&self, record: HistoryRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = match self.read_records().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Existing history unreadable, starting a new ledger"
                );
                Vec::new()
            }
        };

        records.insert(0, record);
        self.write_records(&records).await?;

        tracing::debug!(
            path = %self.path.display(),
            total = records.len(),
            "History record appended"
        );
        Ok(())
    }

    /// Read all records, newest first
    ///
    /// Never fails: problems are reported through [`HistoryListing::error`].
    pub async fn list(&self) -> HistoryListing {
        match self.read_records().await {
            Ok(records) => HistoryListing {
                records,
                error: None,
            },
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read history");
                HistoryListing {
                    records: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn read_records(&self) -> std::result::Result<Vec<HistoryRecord>, LedgerError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LedgerError::Read {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_slice(&raw).map_err(|e| LedgerError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    async fn write_records(
        &self,
        records: &[HistoryRecord],
    ) -> std::result::Result<(), LedgerError> {
        let write_err = |reason: String| LedgerError::Write {
            path: self.path.clone(),
            reason,
        };

        // serde_json writes non-ASCII characters verbatim, keeping the file
        // human-readable for any title language.
        let json = serde_json::to_vec_pretty(records).map_err(|e| write_err(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_err(e.to_string()))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| write_err(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| write_err(e.to_string()))?;

        Ok(())
    }
}

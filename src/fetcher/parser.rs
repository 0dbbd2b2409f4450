//! Parser for yt-dlp output

use crate::error::FetchError;
use crate::types::{FetchEvent, VideoMetadata};
use serde::Deserialize;

/// Prefix marking progress lines produced by [`PROGRESS_TEMPLATE`]
pub const PROGRESS_PREFIX: &str = "vidfetch-progress";

/// Value passed to yt-dlp's `--progress-template`
///
/// Produces one `|`-separated line per update:
/// `vidfetch-progress|<status>|<downloaded>|<total>|<estimate>`.
/// Missing fields are rendered by yt-dlp as `NA`.
pub const PROGRESS_TEMPLATE: &str = "download:vidfetch-progress|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s";

/// Status field of a progress line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Bytes are arriving
    Downloading,
    /// One stream finished (more streams or a merge may follow)
    Finished,
    /// yt-dlp reported an error for the stream
    Error,
}

/// One parsed progress line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressLine {
    /// Reported status
    pub status: StreamStatus,
    /// Bytes downloaded so far
    pub downloaded_bytes: Option<u64>,
    /// Exact total, if yt-dlp knows it
    pub total_bytes: Option<u64>,
    /// Estimated total, if yt-dlp only has an estimate
    pub total_bytes_estimate: Option<u64>,
}

impl ProgressLine {
    /// Convert to a fetch event, preferring the exact total over the estimate
    ///
    /// Only downloading lines map to events: a per-stream "finished" is not
    /// terminal because merging may still follow.
    pub fn to_event(&self) -> Option<FetchEvent> {
        match self.status {
            StreamStatus::Downloading => Some(FetchEvent::Downloading {
                downloaded_bytes: self.downloaded_bytes.unwrap_or(0),
                total_bytes: self.total_bytes.or(self.total_bytes_estimate),
            }),
            StreamStatus::Finished | StreamStatus::Error => None,
        }
    }
}

/// Parse a single stdout line
///
/// Returns `None` for anything that is not one of our progress lines.
pub fn parse_progress_line(line: &str) -> Option<ProgressLine> {
    let mut fields = line.trim().split('|');
    if fields.next()? != PROGRESS_PREFIX {
        return None;
    }

    let status = match fields.next()?.trim() {
        "downloading" => StreamStatus::Downloading,
        "finished" => StreamStatus::Finished,
        "error" => StreamStatus::Error,
        _ => return None,
    };

    Some(ProgressLine {
        status,
        downloaded_bytes: fields.next().and_then(parse_byte_count),
        total_bytes: fields.next().and_then(parse_byte_count),
        total_bytes_estimate: fields.next().and_then(parse_byte_count),
    })
}

/// Parse a byte count that may be `NA`, an integer or a float (estimates are floats)
fn parse_byte_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") || raw.eq_ignore_ascii_case("none") {
        return None;
    }
    if let Ok(value) = raw.parse::<u64>() {
        return Some(value);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| value as u64)
}

#[derive(Deserialize)]
struct ProbeInfo {
    thumbnail: Option<String>,
    title: Option<String>,
    description: Option<String>,
    upload_date: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
}

/// Parse the JSON document printed by `yt-dlp -J`
pub fn parse_probe_output(stdout: &[u8]) -> Result<VideoMetadata, FetchError> {
    let info: ProbeInfo = serde_json::from_slice(stdout)
        .map_err(|e| FetchError::InvalidMetadata(e.to_string()))?;

    let size_bytes = info
        .filesize
        .or(info.filesize_approx)
        .filter(|size| size.is_finite() && *size >= 0.0)
        .map(|size| size as u64);

    Ok(VideoMetadata {
        thumbnail: info.thumbnail,
        title: info.title,
        description: info.description,
        upload_date: info.upload_date,
        size_bytes,
    })
}

/// Keep the last `max_lines` non-empty lines of stderr for error messages
pub fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

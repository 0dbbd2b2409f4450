//! Configuration types for vidfetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Download behavior configuration (output directory, concurrency, readiness wait)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Directory fetched artifacts are written to (default: "./downloads", created if absent)
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Maximum number of fetches running at the same time (default: 3)
    ///
    /// Additional jobs are accepted immediately and wait for a free slot.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,

    /// Filename suggested to clients when serving an artifact (default: "video.mp4")
    #[serde(default = "default_display_filename")]
    pub display_filename: String,

    /// Post-completion readiness wait
    #[serde(default)]
    pub readiness: ReadinessConfig,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_concurrent_fetches: default_max_concurrent(),
            display_filename: default_display_filename(),
            readiness: ReadinessConfig::default(),
        }
    }
}

/// Bounded polling applied before a finished artifact is served
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessConfig {
    /// Delay between filesystem checks, in milliseconds (default: 500)
    #[serde(default = "default_poll_interval", with = "duration_millis_serde")]
    #[schema(value_type = u64)]
    pub poll_interval: Duration,

    /// Total time to wait before giving up, in milliseconds (default: 10000)
    #[serde(default = "default_readiness_timeout", with = "duration_millis_serde")]
    #[schema(value_type = u64)]
    pub timeout: Duration,

    /// Smallest file size accepted as a plausible artifact (default: 1024 bytes)
    ///
    /// Anything smaller is treated as a truncated or placeholder file.
    #[serde(default = "default_min_file_size")]
    pub min_file_size: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            timeout: default_readiness_timeout(),
            min_file_size: default_min_file_size(),
        }
    }
}

/// External fetch tool configuration (yt-dlp)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Format selector passed to yt-dlp (default: "bestvideo+bestaudio/best")
    #[serde(default = "default_format")]
    pub format: String,

    /// Container used when yt-dlp merges separate streams (default: "mp4")
    #[serde(default = "default_merge_format")]
    pub merge_output_format: String,

    /// Extra arguments appended to every yt-dlp invocation
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            format: default_format(),
            merge_output_format: default_merge_format(),
            extra_args: Vec::new(),
        }
    }
}

/// Durable state configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// History ledger file (default: "./download_history.json")
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
        }
    }
}

/// In-memory job registry configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistryConfig {
    /// Evict completed jobs this many seconds after completion (None = keep forever)
    #[serde(default, with = "optional_duration_serde")]
    #[schema(value_type = Option<u64>)]
    pub job_ttl: Option<Duration>,

    /// How often the eviction task runs, in seconds (default: 60)
    #[serde(default = "default_sweep_interval", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            job_ttl: None,
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// How long shutdown waits for in-flight fetches, in seconds (default: 30)
    #[serde(default = "default_shutdown_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub shutdown_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Main configuration for [`VideoFetcher`](crate::VideoFetcher)
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) - output directory, concurrency, readiness wait
/// - [`tools`](ToolsConfig) - yt-dlp location and arguments
/// - [`persistence`](PersistenceConfig) - history ledger file
/// - [`registry`](RegistryConfig) - job retention
/// - [`server`](ServerIntegrationConfig) - REST API
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Durable state
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Job registry retention
    #[serde(default)]
    pub registry: RegistryConfig,

    /// API settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults, so `{}` is a valid file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the service unusable
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_fetches == 0 {
            return Err(Error::Config {
                message: "max_concurrent_fetches must be at least 1".into(),
                key: Some("max_concurrent_fetches".into()),
            });
        }
        if self.download.readiness.poll_interval.is_zero() {
            return Err(Error::Config {
                message: "readiness poll_interval must be greater than zero".into(),
                key: Some("readiness.poll_interval".into()),
            });
        }
        if self.download.display_filename.trim().is_empty() {
            return Err(Error::Config {
                message: "display_filename must not be empty".into(),
                key: Some("display_filename".into()),
            });
        }
        Ok(())
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_concurrent() -> usize {
    3
}

fn default_display_filename() -> String {
    "video.mp4".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_readiness_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_min_file_size() -> u64 {
    1024
}

fn default_true() -> bool {
    true
}

fn default_format() -> String {
    "bestvideo+bestaudio/best".to_string()
}

fn default_merge_format() -> String {
    "mp4".to_string()
}

fn default_history_path() -> PathBuf {
    PathBuf::from("./download_history.json")
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration serialization helper (whole seconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

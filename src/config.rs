//! Configuration types for playlist-dl

use crate::error::{Error, Result};
use crate::types::Quality;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// How concurrent fetches are admitted to the external fetcher
///
/// The fetcher appends to a shared completion ledger and writes into a shared
/// output directory, neither of which tolerate concurrent writers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FetchPolicy {
    /// Only one fetch runs at a time process-wide
    #[default]
    Serialized,
    /// Every dispatched task fetches immediately; the ledger may be corrupted
    /// by concurrent appends
    Parallel,
}

/// Download behavior configuration (directories, ledger, fetch admission)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Output directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Completion ledger consulted by the fetcher to skip repeat work
    /// (default: "./download_archive.txt")
    #[serde(default = "default_archive_file")]
    pub archive_file: PathBuf,

    /// Output filename template, relative to `download_dir`
    /// (default: "%(title)s.%(ext)s")
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Fetch admission policy (default: serialized)
    #[serde(default)]
    pub fetch_policy: FetchPolicy,

    /// Quality used when a request does not specify one (default: low)
    #[serde(default)]
    pub default_quality: Quality,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            archive_file: default_archive_file(),
            output_template: default_output_template(),
            fetch_policy: FetchPolicy::default(),
            default_quality: Quality::default(),
        }
    }
}

impl DownloadConfig {
    /// Full output template handed to the fetcher
    pub fn output_path_template(&self) -> PathBuf {
        self.download_dir.join(&self.output_template)
    }
}

/// External tool paths
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// Snapshot listing and streaming settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StreamConfig {
    /// Refresh interval used when an observer does not ask for one (default: 2s)
    #[serde(default = "default_refresh", with = "secs_f64_serde")]
    #[schema(value_type = f64)]
    pub default_refresh: Duration,

    /// Fastest refresh interval an observer may get (default: 0.25s)
    #[serde(default = "default_min_refresh", with = "secs_f64_serde")]
    #[schema(value_type = f64)]
    pub min_refresh: Duration,

    /// Page size for task listings without an explicit limit (default: 50)
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            default_refresh: default_refresh(),
            min_refresh: default_min_refresh(),
            default_page_size: default_page_size(),
        }
    }
}

impl StreamConfig {
    /// Effective refresh interval for a requested number of seconds
    ///
    /// Never faster than `min_refresh`. Missing, negative, non-finite or
    /// out-of-range requests use `default_refresh`.
    pub fn refresh_interval(&self, requested_secs: Option<f64>) -> Duration {
        let requested = requested_secs
            .filter(|secs| *secs >= 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(self.default_refresh);
        requested.max(self.min_refresh)
    }
}

/// API server configuration
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
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// Main configuration for PlaylistDownloader
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) - directories, ledger, fetch policy
/// - [`tools`](ToolsConfig) - external binary paths
/// - [`stream`](StreamConfig) - listing and streaming cadence
/// - [`server`](ServerIntegrationConfig) - HTTP API
///
/// `download`, `tools` and `server` are flattened so the JSON format stays flat.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Listing and streaming settings
    #[serde(default)]
    pub stream: StreamConfig,

    /// API and external server integration
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the downloader cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.stream.min_refresh.is_zero() {
            return Err(Error::Config {
                message: "min_refresh must be greater than zero".into(),
                key: Some("min_refresh".into()),
            });
        }
        if self.stream.default_refresh.is_zero() {
            return Err(Error::Config {
                message: "default_refresh must be greater than zero".into(),
                key: Some("default_refresh".into()),
            });
        }
        if self.stream.default_page_size == 0 {
            return Err(Error::Config {
                message: "default_page_size must be at least 1".into(),
                key: Some("default_page_size".into()),
            });
        }
        if self.download.output_template.trim().is_empty() {
            return Err(Error::Config {
                message: "output_template must not be empty".into(),
                key: Some("output_template".into()),
            });
        }
        Ok(())
    }

    /// Output directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }
}

// Default value functions
fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_archive_file() -> PathBuf {
    PathBuf::from("download_archive.txt")
}

fn default_output_template() -> String {
    "%(title)s.%(ext)s".to_string()
}

fn default_refresh() -> Duration {
    Duration::from_secs(2)
}

fn default_min_refresh() -> Duration {
    Duration::from_millis(250)
}

fn default_page_size() -> usize {
    50
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_true() -> bool {
    true
}

/// Durations as fractional seconds, so sub-second intervals survive a round trip
mod secs_f64_serde {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

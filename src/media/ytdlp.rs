//! CLI-based collaborator using the external yt-dlp binary

use super::parser::{parse_extractor_output, stderr_tail};
use super::traits::{ExtractedInfo, FetchRequest, MediaExtractor, MediaFetcher};
use crate::config::ToolsConfig;
use crate::error::{Error, ExtractionError, FetchError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// yt-dlp driven extractor and fetcher
///
/// Extraction runs `yt-dlp --dump-single-json` and never downloads media.
/// Fetching downloads the best audio stream, converts it to MP3 at the
/// task's bitrate, and records the completion in the download archive so
/// repeat fetches of the same media are skipped by yt-dlp itself.
///
/// # Examples
///
/// ```no_run
/// use playlist_dl::media::{FetchRequest, MediaFetcher, YtDlp};
/// use playlist_dl::Quality;
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let ytdlp = YtDlp::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// ytdlp
///     .fetch(&FetchRequest {
///         source_url: "https://www.youtube.com/watch?v=abc".into(),
///         quality: Quality::High,
///         output_template: PathBuf::from("downloads/%(title)s.%(ext)s"),
///         archive_path: PathBuf::from("download_archive.txt"),
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary_path: PathBuf,
}

impl YtDlp {
    /// Create a collaborator with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Resolve the binary from configuration
    ///
    /// An explicit `ytdlp_path` wins; otherwise PATH is searched when
    /// `search_path` is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalTool`] when no binary can be found.
    pub fn from_config(tools: &ToolsConfig) -> Result<Self> {
        if let Some(path) = &tools.ytdlp_path {
            return Ok(Self::new(path.clone()));
        }
        if tools.search_path
            && let Some(found) = Self::from_path()
        {
            return Ok(found);
        }
        Err(Error::ExternalTool(
            "yt-dlp not found. Configure ytdlp_path or ensure yt-dlp is in PATH.".into(),
        ))
    }

    /// Path of the binary this collaborator runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn extract_args(url: &str, flat: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--quiet".into(),
            "--no-warnings".into(),
            "--dump-single-json".into(),
        ];
        if flat {
            args.push("--flat-playlist".into());
        } else {
            args.push("--no-playlist".into());
            args.push("--skip-download".into());
        }
        args.push("--".into());
        args.push(url.into());
        args
    }

    fn fetch_args(request: &FetchRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-progress".into(),
            "--format".into(),
            "bestaudio/best".into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            "mp3".into(),
            "--audio-quality".into(),
            format!("{}K", request.quality.bitrate_kbps()).into(),
            "--output".into(),
            request.output_template.clone().into_os_string(),
            "--download-archive".into(),
            request.archive_path.clone().into_os_string(),
            "--no-embed-metadata".into(),
            "--no-embed-thumbnail".into(),
            "--no-write-thumbnail".into(),
        ];
        args.push("--".into());
        args.push(request.source_url.clone().into());
        args
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn extract(&self, url: &str, flat: bool) -> std::result::Result<ExtractedInfo, ExtractionError> {
        let output = Command::new(&self.binary_path)
            .args(Self::extract_args(url, flat))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExtractionError::ToolFailed {
                url: url.to_string(),
                reason: format!("failed to execute yt-dlp: {}", e),
            })?;

        if !output.status.success() {
            return Err(ExtractionError::ToolFailed {
                url: url.to_string(),
                reason: format!("{}: {}", output.status, stderr_tail(&output.stderr)),
            });
        }

        parse_extractor_output(&output.stdout, url)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

#[async_trait]
impl MediaFetcher for YtDlp {
    async fn fetch(&self, request: &FetchRequest) -> std::result::Result<(), FetchError> {
        let output = Command::new(&self.binary_path)
            .args(Self::fetch_args(request))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| FetchError::Spawn {
                reason: format!("{}: {}", self.binary_path.display(), e),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(FetchError::ToolFailed {
                source_url: request.source_url.clone(),
                reason: format!("{}: {}", output.status, stderr_tail(&output.stderr)),
            })
        }
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

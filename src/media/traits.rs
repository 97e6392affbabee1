//! Traits and types for the external media collaborators

use crate::error::{ExtractionError, FetchError};
use crate::types::Quality;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

/// One raw entry of a playlist listing
///
/// Both fields are optional because extractors routinely return partial
/// entries; an entry without a `url` is skipped during expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawEntry {
    /// Media URL
    #[serde(default)]
    pub url: Option<String>,
    /// Media title
    #[serde(default)]
    pub title: Option<String>,
}

/// Metadata returned by a [`MediaExtractor`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedInfo {
    /// Canonical page URL of the resolved item
    pub webpage_url: Option<String>,
    /// URL as originally requested, after redirects the extractor followed
    pub original_url: Option<String>,
    /// Title of the item or playlist
    pub title: Option<String>,
    /// Playlist entries; `None` when the URL is not a playlist.
    /// `None` items are null entries (deleted or private media).
    pub entries: Option<Vec<Option<RawEntry>>>,
}

/// Everything the fetcher needs to produce one output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Media URL to fetch
    pub source_url: String,
    /// Target quality
    pub quality: Quality,
    /// Output path template (directory joined with filename pattern)
    pub output_template: PathBuf,
    /// Completion ledger shared by every fetch
    pub archive_path: PathBuf,
}

/// Resolves input URLs into media metadata
///
/// Implementations must not touch the task registry or the filesystem beyond
/// what the external call itself requires.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Extract metadata for `url`
    ///
    /// With `flat = true` a playlist is listed without resolving each entry;
    /// with `flat = false` only metadata for a single item is resolved.
    /// Nothing is downloaded in either mode.
    async fn extract(&self, url: &str, flat: bool) -> Result<ExtractedInfo, ExtractionError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Fetches and transcodes one media item
///
/// Implementations may read and append to the completion ledger and write
/// into the shared output directory; callers decide whether calls are
/// serialized (see [`FetchPolicy`](crate::config::FetchPolicy)).
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Run the fetch to completion
    async fn fetch(&self, request: &FetchRequest) -> Result<(), FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

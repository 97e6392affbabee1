//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`queue`] - Ingestion, listing and statistics
//! - [`stream`] - Live WebSocket task-list stream
//! - [`system`] - Health, events, OpenAPI

use crate::error::{Error, Result};
use crate::types::{ExtractMode, Quality, TaskState};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

mod queue;
mod stream;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use queue::*;
pub use stream::*;
pub use system::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /add
///
/// Values arrive as raw strings so that bad values produce the API's own
/// `invalid_input` error body rather than a framework rejection.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddQuery {
    /// Playlist (or single item) URL
    #[serde(rename = "playlistURL")]
    pub playlist_url: Option<String>,
    /// "low", "medium" or "high" (default: configured default quality)
    pub quality: Option<String>,
    /// "playlist" or "single" (default: "playlist")
    pub mode: Option<String>,
}

/// Request body for POST /add
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AddRequest {
    /// Playlist (or single item) URL
    #[serde(rename = "playlistURL", alias = "playlist_url", alias = "url")]
    pub playlist_url: String,
    /// Audio quality (default: configured default quality)
    #[serde(default)]
    pub quality: Option<Quality>,
    /// Extraction mode (default: playlist)
    #[serde(default)]
    pub mode: Option<ExtractMode>,
}

/// Query parameters for GET /queue
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Only tasks in this state: "queued", "downloading", "finished" or "error"
    pub state: Option<String>,
    /// Number of matching tasks to skip (default: 0)
    pub skip: Option<String>,
    /// Maximum number of tasks to return (default: configured page size)
    pub limit: Option<String>,
}

/// Query parameters for GET /ws/queue
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    /// Seconds between snapshots (default: 2, never below 0.25)
    pub refresh: Option<String>,
}

/// Ingestion request after validation and defaulting
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IngestParams {
    pub(crate) url: String,
    pub(crate) quality: Quality,
    pub(crate) mode: ExtractMode,
}

impl AddQuery {
    pub(crate) fn validate(self, default_quality: Quality) -> Result<IngestParams> {
        let url = non_blank(self.playlist_url)
            .ok_or_else(|| Error::InvalidInput("playlistURL is required".to_string()))?;
        let quality = parse_optional(self.quality)?.unwrap_or(default_quality);
        let mode = parse_optional(self.mode)?.unwrap_or_default();
        Ok(IngestParams { url, quality, mode })
    }
}

impl AddRequest {
    pub(crate) fn validate(self, default_quality: Quality) -> Result<IngestParams> {
        let url = non_blank(Some(self.playlist_url))
            .ok_or_else(|| Error::InvalidInput("playlistURL is required".to_string()))?;
        Ok(IngestParams {
            url,
            quality: self.quality.unwrap_or(default_quality),
            mode: self.mode.unwrap_or_default(),
        })
    }
}

impl ListQuery {
    /// Parse into `(state filter, skip, limit)`
    pub(crate) fn parse(
        self,
        default_limit: usize,
    ) -> Result<(Option<TaskState>, usize, usize)> {
        let state = parse_optional(self.state)?;
        let skip = parse_count("skip", self.skip)?.unwrap_or(0);
        let limit = parse_count("limit", self.limit)?.unwrap_or(default_limit);
        Ok((state, skip, limit))
    }
}

impl StreamQuery {
    pub(crate) fn refresh_secs(&self) -> Result<Option<f64>> {
        match non_blank(self.refresh.clone()) {
            None => Ok(None),
            Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| {
                Error::InvalidInput(format!("refresh must be a number of seconds, got '{}'", raw))
            }),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_optional<T>(value: Option<String>) -> Result<Option<T>>
where
    T: FromStr<Err = Error>,
{
    non_blank(value).map(|v| v.parse()).transpose()
}

fn parse_count(name: &str, value: Option<String>) -> Result<Option<usize>> {
    non_blank(value)
        .map(|raw| {
            raw.parse::<usize>().map_err(|_| {
                Error::InvalidInput(format!(
                    "{} must be a non-negative integer, got '{}'",
                    name, raw
                ))
            })
        })
        .transpose()
}

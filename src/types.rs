//! Core types for playlist-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Placeholder title used when the extractor does not report one
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Task lifecycle state
///
/// Transitions only move forward: `Queued → Downloading → {Finished | Error}`.
/// `Finished` and `Error` are absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Waiting for a worker to pick it up
    Queued,
    /// Worker started; fetch in progress or waiting on the fetch gate
    Downloading,
    /// Fetch completed successfully
    Finished,
    /// Fetch failed
    Error,
}

impl TaskState {
    /// Whether moving from `self` to `next` is a legal forward transition
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Queued, TaskState::Downloading)
                | (TaskState::Downloading, TaskState::Finished)
                | (TaskState::Downloading, TaskState::Error)
        )
    }

    /// Terminal states never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Finished | TaskState::Error)
    }

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Downloading => "downloading",
            TaskState::Finished => "finished",
            TaskState::Error => "error",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskState {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queued" => Ok(TaskState::Queued),
            "downloading" => Ok(TaskState::Downloading),
            "finished" => Ok(TaskState::Finished),
            "error" => Ok(TaskState::Error),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown task state '{}': expected queued, downloading, finished or error",
                other
            ))),
        }
    }
}

/// Audio quality requested at enqueue time
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// 128 kbps
    #[default]
    Low,
    /// 192 kbps
    Medium,
    /// 320 kbps
    High,
}

impl Quality {
    /// Target MP3 bitrate in kbps
    pub fn bitrate_kbps(&self) -> u32 {
        match self {
            Quality::Low => 128,
            Quality::Medium => 192,
            Quality::High => 320,
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "medium" => Ok(Quality::Medium),
            "high" => Ok(Quality::High),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown quality '{}': expected low, medium or high",
                other
            ))),
        }
    }
}

/// How an input URL is expanded into media entries
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Flat playlist listing; every entry becomes a task
    #[default]
    Playlist,
    /// Metadata for exactly one item
    Single,
}

impl std::str::FromStr for ExtractMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "playlist" => Ok(ExtractMode::Playlist),
            "single" => Ok(ExtractMode::Single),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown mode '{}': expected playlist or single",
                other
            ))),
        }
    }
}

/// One `(source_url, title)` pair produced by extraction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaEntry {
    /// Media URL handed to the fetcher; identity key of the resulting task
    pub source_url: String,
    /// Human-readable title
    pub title: String,
}

impl MediaEntry {
    /// Create an entry, substituting the placeholder title when none is known
    pub fn new(source_url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            source_url: source_url.into(),
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        }
    }
}

/// A single download task
///
/// Instances handed out by the registry are independent copies; mutating one
/// never affects registry state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Media URL; unique across the registry
    pub source_url: String,
    /// Human-readable title
    pub title: String,
    /// Current lifecycle state
    pub state: TaskState,
    /// Quality captured when the task was enqueued
    pub quality: Quality,
    /// When the task was enqueued
    pub created_at: DateTime<Utc>,
    /// When the state last changed
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a freshly queued task from an extracted entry
    pub fn queued(entry: MediaEntry, quality: Quality) -> Self {
        let now = Utc::now();
        Self {
            source_url: entry.source_url,
            title: entry.title,
            state: TaskState::Queued,
            quality,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Event emitted during the task lifecycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Task added to the registry
    Queued {
        /// Task source URL
        source_url: String,
        /// Task title
        title: String,
    },

    /// Worker started on the task
    Downloading {
        /// Task source URL
        source_url: String,
    },

    /// Fetch completed
    Finished {
        /// Task source URL
        source_url: String,
    },

    /// Fetch failed
    Failed {
        /// Task source URL
        source_url: String,
        /// Error message
        error: String,
    },

    /// Downloader is shutting down
    Shutdown,
}

impl Event {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            Event::Queued { .. } => "queued",
            Event::Downloading { .. } => "downloading",
            Event::Finished { .. } => "finished",
            Event::Failed { .. } => "failed",
            Event::Shutdown => "shutdown",
        }
    }
}

/// Response body for a successful ingestion
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    /// Always `"queued"`
    pub status: String,
    /// Number of newly created tasks
    pub count: usize,
    /// Titles of the newly created tasks, in enqueue order
    pub titles: Vec<String>,
}

impl IngestResponse {
    /// Summarize newly created tasks
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            status: "queued".to_string(),
            count: tasks.len(),
            titles: tasks.iter().map(|t| t.title.clone()).collect(),
        }
    }
}

/// Response body for a task listing
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskList {
    /// Matching tasks in registry order
    pub tasks: Vec<Task>,
}

/// Queue statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QueueStats {
    /// Total number of tasks ever enqueued
    pub total: usize,

    /// Tasks waiting to start
    pub queued: usize,

    /// Tasks currently downloading (including those waiting on the fetch gate)
    pub downloading: usize,

    /// Tasks finished successfully
    pub finished: usize,

    /// Tasks that failed
    pub error: usize,

    /// Whether new ingestions are accepted (false during shutdown)
    pub accepting_new: bool,
}

//! Core downloader implementation split into focused submodules.
//!
//! The `PlaylistDownloader` struct and its methods are organized by domain:
//! - [`ingest`] - Input URL validation, expansion and enqueueing
//! - [`dispatch`] - The seam between enqueueing and background execution
//! - [`gate`] - Optional mutual exclusion around fetcher calls
//! - [`worker`] - Per-task execution (fetch and state transitions)
//! - [`snapshot`] - Read-only views of the registry
//! - [`lifecycle`] - Shutdown coordination

mod dispatch;
mod gate;
mod ingest;
mod lifecycle;
mod snapshot;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use dispatch::{Dispatch, TokioDispatcher};
pub use gate::{FetchGate, FetchPermit};

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio_util::task::TaskTracker;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::media::{MediaExtractor, MediaFetcher, YtDlp};
use crate::registry::TaskRegistry;
use crate::types::Event;

use worker::WorkerContext;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Shutdown bookkeeping shared by every clone of the downloader
#[derive(Clone)]
pub(crate) struct LifecycleState {
    /// Flag to indicate whether new ingestions are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Tracks worker tasks spawned by the default dispatcher
    pub(crate) tracker: TaskTracker,
}

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct PlaylistDownloader {
    /// Single owner of task state
    pub(crate) registry: Arc<TaskRegistry>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Turns input URLs into media entries
    pub(crate) extractor: Arc<dyn MediaExtractor>,
    /// Hands newly created tasks to background execution
    pub(crate) dispatcher: Arc<dyn Dispatch>,
    /// Shutdown coordination
    pub(crate) lifecycle: LifecycleState,
}

impl PlaylistDownloader {
    /// Create a downloader backed by the `yt-dlp` CLI
    ///
    /// This validates the configuration, creates the download directory and
    /// locates the `yt-dlp` binary (explicit path first, then `PATH`).
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the configuration is invalid
    /// - [`Error::Io`] if the download directory cannot be created
    /// - [`Error::ExternalTool`] if no `yt-dlp` binary can be found
    pub async fn new(config: Config) -> Result<Self> {
        let ytdlp = Arc::new(YtDlp::from_config(&config.tools)?);
        tracing::info!(binary = %ytdlp.binary_path().display(), "Using yt-dlp");
        Self::with_collaborators(config, ytdlp.clone(), ytdlp).await
    }

    /// Create a downloader with caller-supplied extractor and fetcher
    ///
    /// Tasks are executed on the Tokio runtime through a [`TokioDispatcher`],
    /// with fetches serialized or not according to
    /// [`DownloadConfig::fetch_policy`](crate::config::DownloadConfig::fetch_policy).
    pub async fn with_collaborators(
        config: Config,
        extractor: Arc<dyn MediaExtractor>,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Result<Self> {
        config.validate()?;

        // Ensure the shared output directory exists before any fetch runs
        tokio::fs::create_dir_all(config.download_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download_dir().display(),
                        e
                    ),
                ))
            })?;

        let config = Arc::new(config);
        let registry = Arc::new(TaskRegistry::new());
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let tracker = TaskTracker::new();

        let context = WorkerContext {
            registry: registry.clone(),
            fetcher,
            gate: FetchGate::new(config.download.fetch_policy),
            event_tx: event_tx.clone(),
            config: config.clone(),
        };
        let dispatcher: Arc<dyn Dispatch> =
            Arc::new(TokioDispatcher::new(context, tracker.clone()));

        tracing::debug!(
            fetch_policy = ?config.download.fetch_policy,
            download_dir = %config.download_dir().display(),
            "Downloader initialized"
        );

        Ok(Self::from_parts(
            config, registry, event_tx, extractor, dispatcher, tracker,
        ))
    }

    /// Assemble a downloader from already-built parts
    pub(crate) fn from_parts(
        config: Arc<Config>,
        registry: Arc<TaskRegistry>,
        event_tx: tokio::sync::broadcast::Sender<Event>,
        extractor: Arc<dyn MediaExtractor>,
        dispatcher: Arc<dyn Dispatch>,
        tracker: TaskTracker,
    ) -> Self {
        Self {
            registry,
            event_tx,
            config,
            extractor,
            dispatcher,
            lifecycle: LifecycleState {
                accepting_new: Arc::new(AtomicBool::new(true)),
                tracker,
            },
        }
    }

    /// Subscribe to downloader events
    ///
    /// Each subscriber receives every event emitted after it subscribed.
    /// Slow subscribers that fall more than the channel capacity behind
    /// receive `RecvError::Lagged` and skip ahead.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Sending with no subscribers is not an error.
    pub(crate) fn emit_event(&self, event: Event) {
        let _ = self.event_tx.send(event);
    }

    /// Current configuration
    pub fn get_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Shared task registry
    pub fn registry(&self) -> Arc<TaskRegistry> {
        self.registry.clone()
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server runs concurrently with task execution and listens on the
    /// configured bind address (default: 127.0.0.1:8000).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}

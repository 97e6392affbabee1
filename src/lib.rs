//! # playlist-dl
//!
//! Playlist-aware media download queue with a live task API.
//!
//! ## Design Philosophy
//!
//! playlist-dl is designed to be:
//! - **Fire and forget** - Submitting a playlist returns as soon as its new
//!   entries are queued; downloads run in the background
//! - **Idempotent** - Each media URL becomes at most one task, no matter how
//!   many playlists list it or how often they are resubmitted
//! - **Observable** - Tasks can be listed, streamed as periodic snapshots, or
//!   followed as lifecycle events
//! - **Library-first** - The HTTP API and binary are thin layers over
//!   [`PlaylistDownloader`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use playlist_dl::{Config, ExtractMode, PlaylistDownloader, Quality};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = PlaylistDownloader::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let created = downloader
//!         .ingest(
//!             "https://www.youtube.com/playlist?list=PL123",
//!             ExtractMode::Playlist,
//!             Quality::High,
//!         )
//!         .await?;
//!     println!("queued {} new tasks", created.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP API module
pub mod api;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Media extraction and fetching collaborators
pub mod media;
/// In-memory task registry
pub mod registry;
/// Periodic task-list streaming
pub mod stream;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, FetchPolicy};
pub use downloader::{Dispatch, PlaylistDownloader};
pub use error::{
    ApiError, Error, ErrorDetail, ExtractionError, FetchError, Result, StreamDeliveryError,
    ToHttpStatus,
};
pub use media::{MediaExtractor, MediaFetcher, YtDlp};
pub use registry::TaskRegistry;
pub use stream::{SnapshotSink, StreamEnd};
pub use types::{
    Event, ExtractMode, IngestResponse, MediaEntry, Quality, QueueStats, Task, TaskList,
    TaskState,
};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use playlist_dl::{PlaylistDownloader, Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::default();
///     let downloader = PlaylistDownloader::new(config).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: PlaylistDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}

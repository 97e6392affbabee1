//! Shutdown coordination.

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::error::Result;
use crate::types::Event;

use super::PlaylistDownloader;

/// How long shutdown waits for in-flight workers
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl PlaylistDownloader {
    /// Gracefully shut down the downloader
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new ingestions (later calls fail with
    ///    [`Error::ShuttingDown`](crate::Error::ShuttingDown))
    /// 2. Waits up to 30 seconds for in-flight workers to reach a terminal state
    /// 3. Emits [`Event::Shutdown`]
    ///
    /// Workers still running after the timeout are left to the runtime; their
    /// tasks remain `downloading` in the registry. Calling this more than once
    /// is harmless.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_with_timeout(SHUTDOWN_TIMEOUT).await
    }

    pub(crate) async fn shutdown_with_timeout(&self, timeout: Duration) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        // 1. Stop accepting new ingestions
        self.lifecycle.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new ingestions");

        // 2. Wait for in-flight workers
        let tracker = &self.lifecycle.tracker;
        tracker.close();
        tracing::debug!(active_workers = tracker.len(), "Waiting for active workers");

        match tokio::time::timeout(timeout, tracker.wait()).await {
            Ok(()) => tracing::info!("All active workers completed"),
            Err(_) => tracing::warn!(
                still_running = tracker.len(),
                "Timeout waiting for workers to complete, proceeding with shutdown"
            ),
        }

        // 3. Emit shutdown event
        self.emit_event(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Whether new ingestions are accepted
    pub fn is_accepting(&self) -> bool {
        self.lifecycle.accepting_new.load(Ordering::SeqCst)
    }
}

//! Read-only views of the task registry.

use std::sync::atomic::Ordering;

use tokio_util::sync::CancellationToken;

use crate::stream::{self, SnapshotSink, StreamEnd};
use crate::types::{QueueStats, Task, TaskState};

use super::PlaylistDownloader;

impl PlaylistDownloader {
    /// Filtered, paginated copy of the task list in enqueue order
    ///
    /// The state filter is applied before `skip` and `limit`.
    pub async fn list_tasks(
        &self,
        filter_state: Option<TaskState>,
        skip: usize,
        limit: usize,
    ) -> Vec<Task> {
        self.registry.snapshot(filter_state, skip, limit).await
    }

    /// Copy of every task in enqueue order
    pub async fn snapshot(&self) -> Vec<Task> {
        self.registry.snapshot_all().await
    }

    /// Copy of one task
    pub async fn get_task(&self, source_url: &str) -> Option<Task> {
        self.registry.get(source_url).await
    }

    /// Per-state task counts
    pub async fn queue_stats(&self) -> QueueStats {
        QueueStats {
            accepting_new: self.lifecycle.accepting_new.load(Ordering::SeqCst),
            ..self.registry.stats().await
        }
    }

    /// Stream full task-list snapshots into `sink` until the observer leaves
    ///
    /// `requested_secs` is clamped to the configured minimum refresh interval;
    /// `None` uses the configured default.
    pub async fn stream_tasks<S>(
        &self,
        requested_secs: Option<f64>,
        sink: &mut S,
        disconnected: &CancellationToken,
    ) -> StreamEnd
    where
        S: SnapshotSink + ?Sized,
    {
        let interval = self.config.stream.refresh_interval(requested_secs);
        tracing::debug!(
            requested_secs,
            interval = ?interval,
            "Stream observer connected"
        );

        let end = stream::stream_snapshots(&self.registry, interval, sink, disconnected).await;

        match &end {
            StreamEnd::Disconnected => tracing::debug!("Stream observer disconnected"),
            StreamEnd::DeliveryFailed(e) => {
                tracing::debug!(error = %e, "Stream ended after failed delivery")
            }
        }
        end
    }
}

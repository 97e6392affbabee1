//! Periodic task-list streaming
//!
//! A stream observer receives the full task list immediately and then once per
//! refresh interval until it disconnects or a delivery fails. Each delivery is
//! an independent snapshot taken under the registry lock, so an observer never
//! sees a half-applied update. The interval is never shorter than
//! [`StreamConfig::min_refresh`](crate::config::StreamConfig::min_refresh).
//!
//! Transports plug in through [`SnapshotSink`]; the HTTP layer wraps a
//! WebSocket in one.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::StreamDeliveryError;
use crate::registry::TaskRegistry;
use crate::types::Task;

/// Receives periodic task-list snapshots
#[async_trait]
pub trait SnapshotSink: Send {
    /// Deliver one snapshot; an error ends the stream
    async fn deliver(&mut self, tasks: &[Task]) -> Result<(), StreamDeliveryError>;
}

/// Why a stream stopped
#[derive(Debug)]
pub enum StreamEnd {
    /// The observer signalled that it went away
    Disconnected,
    /// A delivery failed
    DeliveryFailed(StreamDeliveryError),
}

/// Push snapshots of `registry` into `sink` every `interval`
///
/// Runs until `disconnected` is cancelled or a delivery fails. The caller is
/// responsible for clamping `interval` to the configured floor.
pub async fn stream_snapshots<S>(
    registry: &TaskRegistry,
    interval: Duration,
    sink: &mut S,
    disconnected: &CancellationToken,
) -> StreamEnd
where
    S: SnapshotSink + ?Sized,
{
    loop {
        if disconnected.is_cancelled() {
            return StreamEnd::Disconnected;
        }

        let snapshot = registry.snapshot_all().await;
        if let Err(e) = sink.deliver(&snapshot).await {
            return StreamEnd::DeliveryFailed(e);
        }

        tokio::select! {
            _ = disconnected.cancelled() => return StreamEnd::Disconnected,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

//! Per-task execution.
//!
//! A worker owns exactly one task. It moves the task to `downloading`, waits
//! for the fetch gate, runs the fetcher and records the terminal state. No
//! failure, including a panicking fetcher, escapes the worker: it becomes an
//! `error` state plus a [`Event::Failed`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::config::Config;
use crate::error::FetchError;
use crate::media::{FetchRequest, MediaFetcher};
use crate::registry::{TaskRegistry, Transition};
use crate::types::{Event, Task, TaskState};

use super::gate::FetchGate;

/// Everything a worker needs, shared by all workers
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub(crate) registry: Arc<TaskRegistry>,
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    pub(crate) gate: FetchGate,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    pub(crate) config: Arc<Config>,
}

impl WorkerContext {
    fn emit(&self, event: Event) {
        let _ = self.event_tx.send(event);
    }

    fn fetch_request(&self, task: &Task) -> FetchRequest {
        FetchRequest {
            source_url: task.source_url.clone(),
            quality: task.quality,
            output_template: self.config.download.output_path_template(),
            archive_path: self.config.download.archive_file.clone(),
        }
    }
}

/// Execute one task to a terminal state
pub(crate) async fn run_task(context: WorkerContext, task: Task) {
    let source_url = task.source_url.as_str();

    match context
        .registry
        .set_state(source_url, TaskState::Downloading)
        .await
    {
        Transition::Applied => {}
        Transition::Rejected { current } => {
            tracing::warn!(source_url, state = %current, "Task already started; skipping");
            return;
        }
        Transition::Missing => {
            tracing::warn!(source_url, "Dispatched task is not in the registry; skipping");
            return;
        }
    }
    context.emit(Event::Downloading {
        source_url: task.source_url.clone(),
    });

    let request = context.fetch_request(&task);

    // Terminal state is recorded while the gate is still held
    let _permit = context.gate.acquire().await;
    tracing::info!(
        source_url,
        title = %task.title,
        quality = ?task.quality,
        fetcher = context.fetcher.name(),
        "Fetching"
    );

    let outcome = AssertUnwindSafe(context.fetcher.fetch(&request))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            Err(FetchError::ToolFailed {
                source_url: task.source_url.clone(),
                reason: "fetcher panicked".to_string(),
            })
        });

    match outcome {
        Ok(()) => {
            context
                .registry
                .set_state(source_url, TaskState::Finished)
                .await;
            tracing::info!(source_url, title = %task.title, "Task finished");
            context.emit(Event::Finished {
                source_url: task.source_url.clone(),
            });
        }
        Err(e) => {
            context.registry.set_state(source_url, TaskState::Error).await;
            tracing::error!(source_url, title = %task.title, error = %e, "Task failed");
            context.emit(Event::Failed {
                source_url: task.source_url.clone(),
                error: e.to_string(),
            });
        }
    }
}

//! Hand-off from enqueueing to background execution.
//!
//! Ingestion never runs a fetch itself: every newly created task is passed to
//! a [`Dispatch`] implementation, which must return without waiting for the
//! task to make progress. The default [`TokioDispatcher`] spawns one worker per
//! task on the current runtime and tracks it so shutdown can wait for
//! in-flight work.

use tokio_util::task::TaskTracker;

use crate::types::Task;

use super::worker::{self, WorkerContext};

/// Starts background execution of a task
pub trait Dispatch: Send + Sync {
    /// Arrange for `task` to be executed; must not block on the task itself
    fn dispatch(&self, task: Task);
}

/// Spawns one tracked Tokio task per dispatched task
pub struct TokioDispatcher {
    context: WorkerContext,
    tracker: TaskTracker,
}

impl TokioDispatcher {
    pub(crate) fn new(context: WorkerContext, tracker: TaskTracker) -> Self {
        Self { context, tracker }
    }
}

impl Dispatch for TokioDispatcher {
    fn dispatch(&self, task: Task) {
        tracing::debug!(source_url = %task.source_url, "Dispatching task");
        let context = self.context.clone();
        self.tracker.spawn(worker::run_task(context, task));
    }
}

//! In-memory task registry
//!
//! The registry is the only owner of task state. Every read and write goes
//! through one mutex, and nothing is ever handed out by reference: callers get
//! copies, so a snapshot can never observe a half-applied update and a caller
//! can never mutate registry state behind the lock's back.
//!
//! Tasks are kept in insertion order in a `Vec`, with a `HashMap` from source
//! URL to position for O(1) dedup and lookup. Tasks are never removed, so
//! positions stay valid for the life of the process.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::types::{MediaEntry, Quality, QueueStats, Task, TaskState};

/// Result of a state transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The task moved to the requested state
    Applied,
    /// The task exists but the move would go backwards or leave a terminal state
    Rejected {
        /// State the task is in (unchanged)
        current: TaskState,
    },
    /// No task with that source URL
    Missing,
}

#[derive(Debug, Default)]
struct Inner {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

/// Ordered, deduplicating store of every task known to the process
#[derive(Debug, Default)]
pub struct TaskRegistry {
    inner: Mutex<Inner>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a task with this source URL exists
    pub async fn contains(&self, source_url: &str) -> bool {
        self.inner.lock().await.index.contains_key(source_url)
    }

    /// Number of tasks ever enqueued
    pub async fn len(&self) -> usize {
        self.inner.lock().await.tasks.len()
    }

    /// Whether the registry has no tasks
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.tasks.is_empty()
    }

    /// Append every entry whose source URL is not yet known
    ///
    /// The filter and the append happen under one lock acquisition, so two
    /// concurrent callers with overlapping entries can never both insert the
    /// same source URL. Duplicates within `entries` itself are collapsed to
    /// their first occurrence.
    ///
    /// Returns copies of exactly the newly created tasks, in input order.
    pub async fn append_new(&self, entries: Vec<MediaEntry>, quality: Quality) -> Vec<Task> {
        let mut inner = self.inner.lock().await;
        let mut created = Vec::new();

        for entry in entries {
            if inner.index.contains_key(&entry.source_url) {
                continue;
            }
            let task = Task::queued(entry, quality);
            let position = inner.tasks.len();
            inner.index.insert(task.source_url.clone(), position);
            inner.tasks.push(task.clone());
            created.push(task);
        }

        created
    }

    /// Move the named task to `new_state`
    ///
    /// Only forward transitions are applied (see
    /// [`TaskState::can_transition_to`]); anything else leaves the task
    /// untouched.
    pub async fn set_state(&self, source_url: &str, new_state: TaskState) -> Transition {
        let mut inner = self.inner.lock().await;
        let Some(&position) = inner.index.get(source_url) else {
            return Transition::Missing;
        };
        let Some(task) = inner.tasks.get_mut(position) else {
            return Transition::Missing;
        };

        if !task.state.can_transition_to(new_state) {
            return Transition::Rejected {
                current: task.state,
            };
        }

        task.state = new_state;
        task.updated_at = Utc::now();
        Transition::Applied
    }

    /// Copy of one task
    pub async fn get(&self, source_url: &str) -> Option<Task> {
        let inner = self.inner.lock().await;
        inner
            .index
            .get(source_url)
            .and_then(|&position| inner.tasks.get(position))
            .cloned()
    }

    /// Independent copy of matching tasks in registry order
    ///
    /// The optional state filter is applied first, then `skip` and `limit`
    /// window the filtered sequence.
    pub async fn snapshot(
        &self,
        filter_state: Option<TaskState>,
        skip: usize,
        limit: usize,
    ) -> Vec<Task> {
        let inner = self.inner.lock().await;
        inner
            .tasks
            .iter()
            .filter(|task| filter_state.is_none_or(|state| task.state == state))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Independent copy of every task in registry order
    pub async fn snapshot_all(&self) -> Vec<Task> {
        self.inner.lock().await.tasks.clone()
    }

    /// Per-state counts
    ///
    /// `accepting_new` is left `false`; the downloader fills it in.
    pub async fn stats(&self) -> QueueStats {
        let inner = self.inner.lock().await;
        let mut stats = QueueStats {
            total: inner.tasks.len(),
            ..Default::default()
        };
        for task in &inner.tasks {
            match task.state {
                TaskState::Queued => stats.queued += 1,
                TaskState::Downloading => stats.downloading += 1,
                TaskState::Finished => stats.finished += 1,
                TaskState::Error => stats.error += 1,
            }
        }
        stats
    }
}

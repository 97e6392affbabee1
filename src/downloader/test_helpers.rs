//! Shared test helpers: scripted collaborators and downloader constructors.

use crate::config::{Config, FetchPolicy};
use crate::downloader::{Dispatch, PlaylistDownloader};
use crate::error::{ExtractionError, FetchError};
use crate::media::{ExtractedInfo, FetchRequest, MediaExtractor, MediaFetcher, RawEntry};
use crate::registry::TaskRegistry;
use crate::types::Task;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::Semaphore;

/// Extractor that answers from a fixed table of URL -> response
///
/// Unknown URLs fail with [`ExtractionError::ToolFailed`].
#[derive(Default)]
pub(crate) struct ScriptedExtractor {
    responses: HashMap<String, ExtractedInfo>,
    calls: Mutex<Vec<(String, bool)>>,
}

impl ScriptedExtractor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, url: &str, info: ExtractedInfo) -> Self {
        self.responses.insert(url.to_string(), info);
        self
    }

    /// Register a flat playlist listing of `(url, title)` pairs
    pub(crate) fn with_playlist(self, url: &str, entries: &[(&str, &str)]) -> Self {
        let entries = entries
            .iter()
            .map(|(entry_url, title)| {
                Some(RawEntry {
                    url: Some(entry_url.to_string()),
                    title: Some(title.to_string()),
                })
            })
            .collect();
        self.with(
            url,
            ExtractedInfo {
                entries: Some(entries),
                ..Default::default()
            },
        )
    }

    /// Every `(url, flat)` pair the extractor was called with
    pub(crate) fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaExtractor for ScriptedExtractor {
    async fn extract(&self, url: &str, flat: bool) -> Result<ExtractedInfo, ExtractionError> {
        self.calls.lock().unwrap().push((url.to_string(), flat));
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractionError::ToolFailed {
                url: url.to_string(),
                reason: "no scripted response".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Fetcher that records calls and fails for selected URLs
///
/// Tracks how many fetches run at once so tests can observe the fetch gate.
/// With a hold semaphore, every fetch waits for one permit before returning.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    failing: HashSet<String>,
    panicking: HashSet<String>,
    delay: Option<Duration>,
    hold: Option<Arc<Semaphore>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub(crate) fn panicking_on(mut self, url: &str) -> Self {
        self.panicking.insert(url.to_string());
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn held_by(mut self, hold: Arc<Semaphore>) -> Self {
        self.hold = Some(hold);
        self
    }

    pub(crate) fn calls(&self) -> Vec<FetchRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaFetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<(), FetchError> {
        self.calls.lock().unwrap().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(hold) = &self.hold {
            hold.acquire().await.unwrap().forget();
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(&request.source_url) {
            panic!("scripted panic for {}", request.source_url);
        }
        if self.failing.contains(&request.source_url) {
            return Err(FetchError::ToolFailed {
                source_url: request.source_url.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Dispatcher that only records what it was given
#[derive(Default)]
pub(crate) struct RecordingDispatcher {
    dispatched: Mutex<Vec<Task>>,
}

impl RecordingDispatcher {
    pub(crate) fn dispatched(&self) -> Vec<Task> {
        self.dispatched.lock().unwrap().clone()
    }
}

impl Dispatch for RecordingDispatcher {
    fn dispatch(&self, task: Task) {
        self.dispatched.lock().unwrap().push(task);
    }
}

/// Config rooted in a fresh temp directory
///
/// Returns the config and the tempdir (which must be kept alive).
pub(crate) fn test_config(policy: FetchPolicy) -> (Config, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.archive_file = temp_dir.path().join("download_archive.txt");
    config.download.fetch_policy = policy;
    (config, temp_dir)
}

/// Helper to create a downloader running real workers over scripted collaborators.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(
    extractor: Arc<ScriptedExtractor>,
    fetcher: Arc<ScriptedFetcher>,
    policy: FetchPolicy,
) -> (PlaylistDownloader, tempfile::TempDir) {
    let (config, temp_dir) = test_config(policy);
    let downloader = PlaylistDownloader::with_collaborators(config, extractor, fetcher)
        .await
        .unwrap();
    (downloader, temp_dir)
}

/// Helper to create a downloader whose dispatched tasks are only recorded, never run
pub(crate) fn create_recording_downloader(
    extractor: Arc<ScriptedExtractor>,
) -> (PlaylistDownloader, Arc<RecordingDispatcher>) {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);
    let downloader = PlaylistDownloader::from_parts(
        Arc::new(Config::default()),
        Arc::new(TaskRegistry::new()),
        event_tx,
        extractor,
        dispatcher.clone(),
        tokio_util::task::TaskTracker::new(),
    );
    (downloader, dispatcher)
}

/// Poll until every task has reached a terminal state
pub(crate) async fn wait_until_settled(downloader: &PlaylistDownloader) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let tasks = downloader.snapshot().await;
            if tasks.iter().all(|t| t.state.is_terminal()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("tasks did not settle in time");
}

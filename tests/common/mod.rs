//! Shared fixtures for the integration tests
//!
//! Everything here goes through the public API only: the fakes implement the
//! published collaborator traits and are wired in with
//! `PlaylistDownloader::with_collaborators`.

#![allow(dead_code)]

use async_trait::async_trait;
use playlist_dl::media::{ExtractedInfo, FetchRequest, RawEntry};
use playlist_dl::{
    Config, Event, ExtractionError, FetchError, FetchPolicy, MediaExtractor, MediaFetcher,
    PlaylistDownloader,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Extractor answering from a fixed table of playlists
#[derive(Default)]
pub struct TableExtractor {
    playlists: HashMap<String, Vec<(String, String)>>,
}

impl TableExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playlist(mut self, url: &str, entries: &[(&str, &str)]) -> Self {
        self.playlists.insert(
            url.to_string(),
            entries
                .iter()
                .map(|(u, t)| (u.to_string(), t.to_string()))
                .collect(),
        );
        self
    }
}

#[async_trait]
impl MediaExtractor for TableExtractor {
    async fn extract(&self, url: &str, _flat: bool) -> Result<ExtractedInfo, ExtractionError> {
        let entries = self
            .playlists
            .get(url)
            .ok_or_else(|| ExtractionError::ToolFailed {
                url: url.to_string(),
                reason: "unknown playlist".to_string(),
            })?;

        Ok(ExtractedInfo {
            webpage_url: Some(url.to_string()),
            title: Some("playlist".to_string()),
            entries: Some(
                entries
                    .iter()
                    .map(|(u, t)| {
                        Some(RawEntry {
                            url: Some(u.clone()),
                            title: Some(t.clone()),
                        })
                    })
                    .collect(),
            ),
            ..Default::default()
        })
    }

    fn name(&self) -> &'static str {
        "table"
    }
}

/// Fetcher that appends each URL to the completion ledger, or fails on request
#[derive(Default)]
pub struct MarkerFetcher {
    failing: HashSet<String>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl MarkerFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Highest number of fetches observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for MarkerFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<(), FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.fetched.lock().unwrap().push(request.source_url.clone());

        let result = if self.failing.contains(&request.source_url) {
            Err(FetchError::ToolFailed {
                source_url: request.source_url.clone(),
                reason: "exit status 1".to_string(),
            })
        } else {
            let ledger = request.archive_path.clone();
            let line = format!("fake {}\n", request.source_url);
            tokio::task::spawn_blocking(move || {
                use std::io::Write;
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(ledger)?;
                file.write_all(line.as_bytes())
            })
            .await
            .unwrap()
            .map_err(|e| FetchError::ToolFailed {
                source_url: request.source_url.clone(),
                reason: e.to_string(),
            })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &'static str {
        "marker"
    }
}

/// Build a downloader over the fakes inside a fresh temporary directory
pub async fn create_downloader(
    extractor: TableExtractor,
    fetcher: Arc<MarkerFetcher>,
    policy: FetchPolicy,
) -> (PlaylistDownloader, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.archive_file = temp_dir.path().join("downloads/archive.txt");
    config.download.fetch_policy = policy;
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();

    let downloader = PlaylistDownloader::with_collaborators(config, Arc::new(extractor), fetcher)
        .await
        .unwrap();
    (downloader, temp_dir)
}

/// Outcome of waiting on lifecycle events for a set of URLs
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Settled {
    pub finished: Vec<String>,
    pub failed: Vec<String>,
}

/// Collect terminal events from `events` until `expected` tasks have settled
pub async fn wait_for_terminal(
    events: &mut tokio::sync::broadcast::Receiver<Event>,
    expected: usize,
    timeout: Duration,
) -> Settled {
    let mut settled = Settled::default();
    tokio::time::timeout(timeout, async {
        while settled.finished.len() + settled.failed.len() < expected {
            match events.recv().await {
                Ok(Event::Finished { source_url }) => settled.finished.push(source_url),
                Ok(Event::Failed { source_url, .. }) => settled.failed.push(source_url),
                Ok(_) => continue,
                Err(e) => panic!("event channel failed: {e}"),
            }
        }
    })
    .await
    .expect("timed out waiting for tasks to settle");
    settled
}

//! Application state for the API server

use crate::{Config, PlaylistDownloader};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the downloader instance and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The main PlaylistDownloader instance
    pub downloader: Arc<PlaylistDownloader>,

    /// Configuration (defaults for quality, page size and refresh)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(downloader: Arc<PlaylistDownloader>, config: Arc<Config>) -> Self {
        Self { downloader, config }
    }
}

//! Input URL ingestion.

use std::sync::atomic::Ordering;

use crate::error::{Error, Result};
use crate::media;
use crate::types::{Event, ExtractMode, Quality, Task};

use super::PlaylistDownloader;

impl PlaylistDownloader {
    /// Expand `input_url` into tasks and enqueue the ones not seen before
    ///
    /// The URL is expanded by the configured extractor (a flat playlist
    /// listing in [`ExtractMode::Playlist`], a single item otherwise). Entries
    /// whose source URL is already in the registry are skipped, duplicates
    /// within the same listing are collapsed, and every newly created task is
    /// dispatched for background execution before this method returns. Fetch
    /// outcomes are never awaited.
    ///
    /// Returns the newly created tasks in listing order. An empty result is a
    /// success: the playlist was empty or every entry was already known.
    ///
    /// # Errors
    ///
    /// - [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) has begun
    /// - [`Error::InvalidInput`] if `input_url` is blank or not a URL
    /// - [`Error::Extraction`] if the extractor fails or, in playlist mode,
    ///   the URL is not a playlist
    ///
    /// The registry is unchanged on every error path.
    pub async fn ingest(
        &self,
        input_url: &str,
        mode: ExtractMode,
        quality: Quality,
    ) -> Result<Vec<Task>> {
        if !self.lifecycle.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let input_url = validate_input_url(input_url)?;

        tracing::debug!(
            input_url,
            mode = ?mode,
            extractor = self.extractor.name(),
            "Expanding input URL"
        );
        let entries = media::expand(self.extractor.as_ref(), input_url, mode).await?;
        let listed = entries.len();

        let created = self.registry.append_new(entries, quality).await;

        for task in &created {
            self.emit_event(Event::Queued {
                source_url: task.source_url.clone(),
                title: task.title.clone(),
            });
            self.dispatcher.dispatch(task.clone());
        }

        tracing::info!(
            input_url,
            listed,
            created = created.len(),
            skipped = listed - created.len(),
            quality = ?quality,
            "Ingested input URL"
        );

        Ok(created)
    }

    /// [`ingest`](Self::ingest) with the configured default quality
    pub async fn ingest_default(&self, input_url: &str, mode: ExtractMode) -> Result<Vec<Task>> {
        self.ingest(input_url, mode, self.config.download.default_quality)
            .await
    }
}

/// Trim and check that `input_url` parses as an absolute URL
///
/// Any scheme is accepted; the extractor decides what it can resolve.
pub(crate) fn validate_input_url(input_url: &str) -> Result<&str> {
    let trimmed = input_url.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("playlistURL is required".to_string()));
    }

    url::Url::parse(trimmed)
        .map_err(|e| Error::InvalidInput(format!("'{}' is not a valid URL: {}", trimmed, e)))?;

    Ok(trimmed)
}

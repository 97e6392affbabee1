//! Extraction adapter: one input URL into `(source_url, title)` pairs

use super::traits::MediaExtractor;
use crate::error::ExtractionError;
use crate::types::{ExtractMode, MediaEntry};

/// Expand `input_url` into media entries
///
/// - [`ExtractMode::Playlist`] lists the playlist flat and emits one entry per
///   valid item, in playlist order. Null entries and entries without a URL are
///   skipped.
/// - [`ExtractMode::Single`] resolves one item and emits exactly one entry,
///   using the canonical page URL, then the original URL, then the input URL.
///
/// Missing titles become [`UNKNOWN_TITLE`](crate::types::UNKNOWN_TITLE).
///
/// # Errors
///
/// - [`ExtractionError::NotAPlaylist`] when playlist mode gets a response
///   without an entries collection
/// - whatever the extractor itself reports
pub async fn expand<E>(
    extractor: &E,
    input_url: &str,
    mode: ExtractMode,
) -> Result<Vec<MediaEntry>, ExtractionError>
where
    E: MediaExtractor + ?Sized,
{
    match mode {
        ExtractMode::Playlist => {
            let info = extractor.extract(input_url, true).await?;
            let entries = info.entries.ok_or_else(|| ExtractionError::NotAPlaylist {
                url: input_url.to_string(),
            })?;

            let total = entries.len();
            let expanded: Vec<MediaEntry> = entries
                .into_iter()
                .flatten()
                .filter_map(|entry| {
                    let url = entry.url.filter(|u| !u.trim().is_empty())?;
                    Some(MediaEntry::new(url, entry.title))
                })
                .collect();

            if expanded.len() < total {
                tracing::debug!(
                    url = %input_url,
                    skipped = total - expanded.len(),
                    "Skipped malformed playlist entries"
                );
            }

            Ok(expanded)
        }
        ExtractMode::Single => {
            let info = extractor.extract(input_url, false).await?;
            let source_url = info
                .webpage_url
                .or(info.original_url)
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| input_url.to_string());

            Ok(vec![MediaEntry::new(source_url, info.title)])
        }
    }
}

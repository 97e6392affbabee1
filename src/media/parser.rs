//! Parser for yt-dlp JSON output

use super::traits::{ExtractedInfo, RawEntry};
use crate::error::ExtractionError;
use serde_json::Value;

/// Number of trailing stderr lines kept in failure reasons
const STDERR_TAIL_LINES: usize = 5;

/// Parse the output of `yt-dlp --dump-single-json`
///
/// The top level must be a JSON object. An `entries` array marks a playlist;
/// each element is kept as `None` when it is null or not an object, so that
/// expansion can skip it without failing the whole listing.
///
/// # Errors
///
/// Returns [`ExtractionError::InvalidOutput`] when stdout is not a JSON object.
pub fn parse_extractor_output(stdout: &[u8], url: &str) -> Result<ExtractedInfo, ExtractionError> {
    let value: Value =
        serde_json::from_slice(stdout).map_err(|e| ExtractionError::InvalidOutput {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let Value::Object(mut object) = value else {
        return Err(ExtractionError::InvalidOutput {
            url: url.to_string(),
            reason: "expected a JSON object at the top level".to_string(),
        });
    };

    let entries = match object.remove("entries") {
        Some(Value::Array(items)) => Some(items.into_iter().map(parse_entry).collect()),
        _ => None,
    };

    Ok(ExtractedInfo {
        webpage_url: string_field(&object, "webpage_url"),
        original_url: string_field(&object, "original_url"),
        title: string_field(&object, "title"),
        entries,
    })
}

/// Fields of unexpected type are dropped individually; the entry survives
fn parse_entry(value: Value) -> Option<RawEntry> {
    match value {
        Value::Object(object) => Some(RawEntry {
            url: string_field(&object, "url"),
            title: string_field(&object, "title"),
        }),
        _ => None,
    }
}

fn string_field(object: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Last few non-empty lines of a process's stderr, for error messages
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/playlist?list=abc";

    #[test]
    fn playlist_keeps_null_and_partial_entries_as_markers() {
        let json = br#"{
            "title": "Mix",
            "webpage_url": "https://example.com/playlist?list=abc",
            "entries": [
                {"url": "https://example.com/watch?v=1", "title": "One"},
                null,
                {"title": "no url"},
                "garbage",
                {"url": "https://example.com/watch?v=2"}
            ]
        }"#;

        let info = parse_extractor_output(json, URL).unwrap();
        let entries = info.entries.unwrap();

        assert_eq!(entries.len(), 5);
        assert_eq!(
            entries[0],
            Some(RawEntry {
                url: Some("https://example.com/watch?v=1".into()),
                title: Some("One".into()),
            })
        );
        assert_eq!(entries[1], None);
        assert_eq!(entries[2].as_ref().unwrap().url, None);
        assert_eq!(entries[3], None);
        assert_eq!(entries[4].as_ref().unwrap().title, None);
        assert_eq!(info.title.as_deref(), Some("Mix"));
    }

    #[test]
    fn entry_with_non_string_title_keeps_its_url() {
        let json = br#"{"entries": [{"url": "https://a", "title": 123}, {"url": "https://b"}]}"#;

        let entries = parse_extractor_output(json, URL).unwrap().entries.unwrap();
        assert_eq!(
            entries,
            vec![
                Some(RawEntry {
                    url: Some("https://a".into()),
                    title: None,
                }),
                Some(RawEntry {
                    url: Some("https://b".into()),
                    title: None,
                }),
            ]
        );
    }

    #[test]
    fn single_item_has_no_entries() {
        let json = br#"{
            "title": "Song",
            "webpage_url": "https://example.com/watch?v=1",
            "original_url": "https://youtu.be/1"
        }"#;

        let info = parse_extractor_output(json, URL).unwrap();
        assert!(info.entries.is_none());
        assert_eq!(info.webpage_url.as_deref(), Some("https://example.com/watch?v=1"));
        assert_eq!(info.original_url.as_deref(), Some("https://youtu.be/1"));
    }

    #[test]
    fn non_array_entries_is_not_a_playlist() {
        let info = parse_extractor_output(br#"{"entries": null}"#, URL).unwrap();
        assert!(info.entries.is_none());
    }

    #[test]
    fn malformed_output_is_invalid() {
        let err = parse_extractor_output(b"ERROR: nope", URL).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidOutput { .. }));

        let err = parse_extractor_output(b"[1, 2]", URL).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidOutput { .. }));
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr = b"a\n\nb\nc\nd\ne\nf\n";
        assert_eq!(stderr_tail(stderr), "b\nc\nd\ne\nf");
        assert_eq!(stderr_tail(b""), "");
    }
}

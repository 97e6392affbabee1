//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the playlist-dl HTTP API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the playlist-dl HTTP API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "playlist-dl API",
        version = "0.1.0",
        description = "Submit playlists for MP3 download, list tasks and watch the queue live",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://127.0.0.1:8000", description = "Local development server")
    ),
    paths(
        // Ingestion and queue
        crate::api::routes::add_playlist,
        crate::api::routes::add_playlist_json,
        crate::api::routes::list_queue,
        crate::api::routes::queue_stats,
        crate::api::routes::queue_stream,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::TaskState,
        crate::types::Quality,
        crate::types::ExtractMode,
        crate::types::Task,
        crate::types::TaskList,
        crate::types::IngestResponse,
        crate::types::QueueStats,
        crate::types::Event,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::ToolsConfig,
        crate::config::StreamConfig,
        crate::config::ApiConfig,
        crate::config::FetchPolicy,

        // API request types from routes
        crate::api::routes::AddRequest,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "queue", description = "Submit playlists, list tasks, watch the queue"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_has_paths() {
        let spec = ApiDoc::openapi();

        for path in ["/add", "/queue", "/queue/stats", "/ws/queue", "/events"] {
            assert!(
                spec.paths.paths.contains_key(path),
                "OpenAPI spec should document {path}"
            );
        }
    }

    #[test]
    fn test_openapi_spec_has_components() {
        let spec = ApiDoc::openapi();
        let components = spec.components.unwrap();

        for schema in ["Task", "TaskState", "IngestResponse", "ApiError"] {
            assert!(
                components.schemas.contains_key(schema),
                "OpenAPI spec should define {schema}"
            );
        }
    }

    #[test]
    fn test_openapi_spec_info() {
        let spec = ApiDoc::openapi();

        assert_eq!(spec.info.title, "playlist-dl API");
        assert!(spec.info.description.is_some());

        let tag_names: Vec<String> = spec
            .tags
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert!(tag_names.contains(&"queue".to_string()));
        assert!(tag_names.contains(&"system".to_string()));
    }
}

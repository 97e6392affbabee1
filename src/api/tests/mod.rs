use super::*;
use crate::config::FetchPolicy;
use crate::downloader::test_helpers::{
    ScriptedExtractor, ScriptedFetcher, create_recording_downloader, wait_until_settled,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tower::ServiceExt;


const PLAYLIST: &str = "https://www.youtube.com/playlist?list=PL1";

/// Helper to create a test PlaylistDownloader instance wrapped in Arc
async fn create_test_downloader(
    extractor: ScriptedExtractor,
    fetcher: ScriptedFetcher,
) -> (Arc<PlaylistDownloader>, tempfile::TempDir) {
    let (downloader, temp_dir) = crate::downloader::test_helpers::create_test_downloader(
        Arc::new(extractor),
        Arc::new(fetcher),
        FetchPolicy::Serialized,
    )
    .await;
    (Arc::new(downloader), temp_dir)
}

/// Router over a downloader with the standard two-entry playlist
async fn create_test_app() -> (Router, Arc<PlaylistDownloader>, tempfile::TempDir) {
    let extractor =
        ScriptedExtractor::new().with_playlist(PLAYLIST, &[("https://a", "A"), ("https://b", "B")]);
    let (downloader, temp_dir) = create_test_downloader(extractor, ScriptedFetcher::new()).await;
    let app = create_router(downloader.clone(), downloader.get_config());
    (app, downloader, temp_dir)
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (downloader, _temp_dir) =
        create_test_downloader(ScriptedExtractor::new(), ScriptedFetcher::new()).await;

    let mut config = (*downloader.get_config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let downloader = downloader.clone();
        let config = config.clone();
        async move { start_api_server(downloader, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");
    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (_app, downloader, _temp_dir) = create_test_app().await;

    let mut config = (*downloader.get_config()).clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (_app, downloader, _temp_dir) = create_test_app().await;

    let mut config = (*downloader.get_config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (_app, downloader, _temp_dir) = create_test_app().await;

    let mut config = (*downloader.get_config()).clone();
    config.server.api.swagger_ui = false;
    let app = create_router(downloader.clone(), Arc::new(config));
    let (status, _) = get(app, "/swagger-ui/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let app = create_router(downloader.clone(), downloader.get_config());
    let request = Request::builder()
        .uri("/swagger-ui/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_ne!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_build_cors_layer_with_specific_origins() {
    // Specific origins must parse without panicking; invalid ones are skipped
    let _layer = build_cors_layer(&[
        "http://localhost:3000".to_string(),
        "not a header value\n".to_string(),
    ]);
}

//! Ingestion, listing and statistics handlers.

use super::{AddQuery, AddRequest, IngestParams, ListQuery};
use crate::api::AppState;
use crate::error::Error;
use crate::types::{IngestResponse, TaskList};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /add - Expand a playlist URL and enqueue its new entries
///
/// Returns as soon as the new tasks are enqueued; downloads run in the
/// background. Entries already known are skipped, so `count` may be 0.
#[utoipa::path(
    get,
    path = "/add",
    tag = "queue",
    params(AddQuery),
    responses(
        (status = 200, description = "Tasks enqueued", body = IngestResponse),
        (status = 400, description = "Missing or invalid input, or the URL could not be expanded", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn add_playlist(
    State(state): State<AppState>,
    Query(query): Query<AddQuery>,
) -> Response {
    match query.validate(state.config.download.default_quality) {
        Ok(params) => ingest(&state, params).await,
        Err(e) => e.into_response(),
    }
}

/// POST /add - Expand a playlist URL given in a JSON body
#[utoipa::path(
    post,
    path = "/add",
    tag = "queue",
    request_body = AddRequest,
    responses(
        (status = 200, description = "Tasks enqueued", body = IngestResponse),
        (status = 400, description = "Missing or invalid input, or the URL could not be expanded", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn add_playlist_json(
    State(state): State<AppState>,
    body: Result<Json<AddRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return Error::InvalidInput(format!("invalid request body: {}", rejection.body_text()))
                .into_response();
        }
    };

    match request.validate(state.config.download.default_quality) {
        Ok(params) => ingest(&state, params).await,
        Err(e) => e.into_response(),
    }
}

async fn ingest(state: &AppState, params: IngestParams) -> Response {
    match state
        .downloader
        .ingest(&params.url, params.mode, params.quality)
        .await
    {
        Ok(created) => (StatusCode::OK, Json(IngestResponse::from_tasks(&created))).into_response(),
        Err(e) => {
            tracing::warn!(url = %params.url, error = %e, "Ingestion rejected");
            e.into_response()
        }
    }
}

/// GET /queue - List tasks
///
/// The state filter is applied before pagination.
#[utoipa::path(
    get,
    path = "/queue",
    tag = "queue",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching tasks in enqueue order", body = TaskList),
        (status = 400, description = "Invalid filter or pagination", body = crate::error::ApiError)
    )
)]
pub async fn list_queue(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    match query.parse(state.config.stream.default_page_size) {
        Ok((filter_state, skip, limit)) => {
            let tasks = state.downloader.list_tasks(filter_state, skip, limit).await;
            (StatusCode::OK, Json(TaskList { tasks })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// GET /queue/stats - Get queue statistics
#[utoipa::path(
    get,
    path = "/queue/stats",
    tag = "queue",
    responses(
        (status = 200, description = "Queue statistics", body = crate::types::QueueStats)
    )
)]
pub async fn queue_stats(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.downloader.queue_stats().await))
}

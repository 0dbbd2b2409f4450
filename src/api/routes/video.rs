//! Video handlers: metadata, download start/attach/retrieve, progress.

use super::{
    DownloadQuery, DownloadStartedResponse, ParseQuery, ParseResponse, ProgressQuery,
    ProgressResponse,
};
use crate::api::AppState;
use crate::error::Error;
use crate::types::Artifact;
use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// MIME type of served artifacts
const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// GET /api/parse - Video metadata
#[utoipa::path(
    get,
    path = "/api/parse",
    tag = "video",
    params(ParseQuery),
    responses(
        (status = 200, description = "Metadata, or {success: false, error} on failure", body = ParseResponse)
    )
)]
pub async fn parse_video(
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
) -> Response {
    let url = query.url.unwrap_or_default();

    match state.fetcher.probe(&url).await {
        Ok(data) => Json(ParseResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Metadata lookup failed");
            e.into_response()
        }
    }
}

/// GET /api/download - Start, attach to, or retrieve a download
///
/// A completed task streams the file once it passes the readiness wait;
/// any other task is started (or attached to) and its filename returned.
#[utoipa::path(
    get,
    path = "/api/download",
    tag = "video",
    params(DownloadQuery),
    responses(
        (status = 200, description = "Started/attached job. A finished task instead streams video/mp4, and failures return {success: false, error}", body = DownloadStartedResponse)
    )
)]
pub async fn download_video(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let task_id = query.task_id.unwrap_or_default();
    let url = query.url.unwrap_or_default();

    match state.fetcher.retrieve(&task_id, &url).await {
        Ok(artifact) => serve_artifact(artifact).await,
        Err(Error::NotReady { .. }) => match state.fetcher.start_or_attach(&task_id, &url).await {
            Ok(started) => Json(DownloadStartedResponse {
                success: true,
                task_id: started.task_id,
                filename: started.filename,
            })
            .into_response(),
            Err(e) => e.into_response(),
        },
        Err(e) => e.into_response(),
    }
}

/// Stream a ready artifact from disk as an attachment
async fn serve_artifact(artifact: Artifact) -> Response {
    let file = match tokio::fs::File::open(&artifact.path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(path = %artifact.path.display(), error = %e, "Failed to open artifact");
            return Error::Io(e).into_response();
        }
    };

    let body = Body::from_stream(ReaderStream::new(file));

    (
        [
            (header::CONTENT_TYPE, VIDEO_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.display_filename),
            ),
            (header::CONTENT_LENGTH, artifact.size_bytes.to_string()),
        ],
        body,
    )
        .into_response()
}

/// GET /api/progress - Download progress
#[utoipa::path(
    get,
    path = "/api/progress",
    tag = "video",
    params(ProgressQuery),
    responses(
        (status = 200, description = "Progress percentage (0 for unknown tasks)", body = ProgressResponse)
    )
)]
pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Json<ProgressResponse> {
    let task_id = query.task_id.unwrap_or_default();
    Json(ProgressResponse {
        progress: state.fetcher.get_progress(&task_id),
    })
}

//! History handler.

use super::HistoryResponse;
use crate::api::AppState;
use axum::{Json, extract::State};

/// GET /api/history - Retrieved downloads, newest first
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "history",
    responses(
        (status = 200, description = "Download history; success is false (with empty data) if the file is unreadable", body = HistoryResponse)
    )
)]
pub async fn get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let listing = state.fetcher.history().await;

    Json(HistoryResponse {
        success: listing.is_ok(),
        data: listing.records,
        error: listing.error,
    })
}

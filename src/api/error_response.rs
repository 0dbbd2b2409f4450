//! HTTP error response handling for the API
//!
//! Client-facing failures are reported in-band: HTTP 200 with a
//! `{success: false, error, code}` body the frontend inspects.

use crate::error::{ApiError, Error};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let api_error: ApiError = self.into();
        api_error.into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.code == "internal_error" {
            tracing::error!(error = %self.error, "Request failed");
        }
        (StatusCode::OK, Json(self)).into_response()
    }
}

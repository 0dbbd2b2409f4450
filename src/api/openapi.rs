//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the vidfetch REST API using utoipa
//! for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the vidfetch REST API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "vidfetch REST API",
        version = "0.1.0",
        description = "Background video downloads with progress polling and a download history",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://127.0.0.1:8000", description = "Local development server")
    ),
    paths(
        // Video
        crate::api::routes::parse_video,
        crate::api::routes::download_video,
        crate::api::routes::get_progress,

        // History
        crate::api::routes::get_history,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::TaskId,
        crate::types::VideoMetadata,
        crate::types::HistoryRecord,
        crate::types::Event,

        // API response types from routes
        crate::api::routes::ParseResponse,
        crate::api::routes::DownloadStartedResponse,
        crate::api::routes::ProgressResponse,
        crate::api::routes::HistoryResponse,
        crate::api::routes::HealthResponse,

        // Error types from error.rs
        crate::error::ApiError,
    )),
    tags(
        (name = "video", description = "Video metadata, downloads and progress"),
        (name = "history", description = "Download history - Videos handed out to clients"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;

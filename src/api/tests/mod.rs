use super::*;
use crate::orchestrator::test_helpers::{ScriptedFetcher, test_config, wait_for_idle};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;


/// Build an orchestrator around `fetcher` plus a router over it.
/// Returns the tempdir too (which must be kept alive).
async fn create_test_app(
    fetcher: ScriptedFetcher,
) -> (Router, Arc<VideoFetcher>, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = test_config(temp_dir.path());
    let orchestrator = Arc::new(
        VideoFetcher::with_fetcher(config, Arc::new(fetcher))
            .await
            .unwrap(),
    );
    let app = create_router(orchestrator.clone(), orchestrator.config().clone());
    (app, orchestrator, temp_dir)
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let response = get(app, uri).await;
    assert_eq!(response.status(), StatusCode::OK, "{uri} should answer 200");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (_app, orchestrator, _temp_dir) = create_test_app(ScriptedFetcher::default()).await;

    let mut config = (**orchestrator.config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let orchestrator = orchestrator.clone();
        let config = config.clone();
        async move { start_api_server(orchestrator, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");
    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _orchestrator, _temp_dir) = create_test_app(ScriptedFetcher::default()).await;

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (_app, orchestrator, _temp_dir) = create_test_app(ScriptedFetcher::default()).await;

    let mut config = (**orchestrator.config()).clone();
    config.server.api.cors_origins = vec!["http://127.0.0.1:5500".to_string()];
    let app = create_router(orchestrator, Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://127.0.0.1:5500")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://127.0.0.1:5500"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (_app, orchestrator, _temp_dir) = create_test_app(ScriptedFetcher::default()).await;

    let mut config = (**orchestrator.config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(orchestrator, Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (app, orchestrator, _temp_dir) = create_test_app(ScriptedFetcher::default()).await;

    let response = get(&app, "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut config = (**orchestrator.config()).clone();
    config.server.api.swagger_ui = false;
    let app = create_router(orchestrator, Arc::new(config));

    let response = get(&app, "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//! REST API server example
//!
//! Runs vidfetch with the REST API the browser frontend talks to.
//!
//! ```text
//! cargo run --example rest_api_server [config.json]
//! ```
//!
//! After starting, you can:
//! - View Swagger UI at http://127.0.0.1:8000/swagger-ui
//! - Start a download via GET http://127.0.0.1:8000/api/download?url=...&task_id=...
//! - Poll progress via GET http://127.0.0.1:8000/api/progress?task_id=...
//! - Stream events via GET http://127.0.0.1:8000/api/events

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vidfetch::{Config, VideoFetcher, run_with_shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    let base = format!("http://{}", config.server.api.bind_address);

    let fetcher = Arc::new(VideoFetcher::new(config).await?);
    let _eviction = fetcher.start_job_eviction();
    let api = fetcher.spawn_api_server();

    println!("Starting vidfetch REST API server (fetcher: {})", fetcher.fetcher_name());
    println!("Swagger UI: {base}/swagger-ui");
    println!("Events stream: {base}/api/events");
    println!();
    println!("Example commands:");
    println!("  # Video metadata");
    println!("  curl '{base}/api/parse?url=https://www.youtube.com/watch?v=dQw4w9WgXcQ'");
    println!();
    println!("  # Start (repeat the same call once progress hits 100 to fetch the file)");
    println!(
        "  curl -OJ '{base}/api/download?url=https://www.youtube.com/watch?v=dQw4w9WgXcQ&task_id=demo'"
    );
    println!();
    println!("  # Progress");
    println!("  curl '{base}/api/progress?task_id=demo'");

    tokio::select! {
        result = api => {
            result??;
        }
        result = run_with_shutdown(&fetcher) => {
            result?;
        }
    }

    Ok(())
}

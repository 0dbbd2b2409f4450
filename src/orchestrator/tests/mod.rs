use super::test_helpers::*;
use super::*;
use crate::types::FetchEvent;
use std::sync::atomic::Ordering;
use tokio::sync::Notify;


/// Drain every event currently buffered on `rx`
fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Start `task_id`, let the scripted fetch run to the end and return the job
async fn run_to_completion(orchestrator: &VideoFetcher, task_id: &str) -> Job {
    orchestrator
        .start_or_attach(task_id, "https://example.com/watch?v=abc")
        .await
        .unwrap();
    wait_for_idle(orchestrator).await;
    orchestrator.job(task_id).unwrap()
}

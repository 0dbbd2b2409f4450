//! Event-driven wait helpers

use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use vidfetch::{Event, TaskId};

/// Result of waiting for a fetch to finish
#[derive(Debug, PartialEq)]
pub enum WaitResult {
    /// The fetcher reported completion
    Completed,
    /// The fetch failed with this error
    Failed(String),
    /// Timeout waiting for completion
    Timeout,
    /// Channel closed unexpectedly
    ChannelClosed,
}

/// Wait for `task_id` to reach a terminal state
///
/// Subscribe before starting the job so no event is missed.
pub async fn wait_for_completion(
    events: &mut Receiver<Event>,
    task_id: &str,
    timeout: Duration,
) -> WaitResult {
    let task_id = TaskId::parse(task_id).unwrap();

    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::FetchComplete { task_id: id }) if id == task_id => {
                    return WaitResult::Completed;
                }
                Ok(Event::FetchFailed { task_id: id, error }) if id == task_id => {
                    return WaitResult::Failed(error);
                }
                Ok(_) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(_) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    result.unwrap_or(WaitResult::Timeout)
}

/// Collect all events until timeout or the predicate is satisfied
pub async fn collect_events_until<F>(
    events: &mut Receiver<Event>,
    timeout: Duration,
    stop_predicate: F,
) -> Vec<Event>
where
    F: Fn(&Event) -> bool,
{
    let mut collected = Vec::new();

    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let should_stop = stop_predicate(&event);
            collected.push(event);
            if should_stop {
                break;
            }
        }
    })
    .await;

    collected
}

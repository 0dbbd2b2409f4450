//! Shutdown coordination and job eviction.

use crate::error::Result;
use crate::types::Event;
use std::sync::atomic::Ordering;

use super::VideoFetcher;

impl VideoFetcher {
    /// Gracefully shut down the orchestrator
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new jobs (attach and progress queries keep working)
    /// 2. Waits for in-flight fetches, up to `server.api.shutdown_timeout`
    /// 3. Emits [`Event::Shutdown`]
    ///
    /// Fetches are never cancelled; any still running after the timeout are
    /// left to the runtime.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.workers.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new jobs");

        let shutdown_timeout = self.config.server.api.shutdown_timeout;
        match tokio::time::timeout(shutdown_timeout, self.wait_for_active_fetches()).await {
            Ok(()) => tracing::info!("All active fetches completed"),
            Err(_) => {
                let remaining = self.active_fetch_count().await;
                tracing::warn!(
                    remaining,
                    "Timeout waiting for fetches to complete, proceeding with shutdown"
                );
            }
        }

        let _ = self.event_tx.send(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Number of launched fetches that have not finished yet
    pub async fn active_fetch_count(&self) -> usize {
        self.workers
            .active_fetches
            .lock()
            .await
            .values()
            .filter(|fetch| !fetch.handle.is_finished())
            .count()
    }

    /// Whether new jobs are currently accepted
    pub fn is_accepting(&self) -> bool {
        self.workers.accepting_new.load(Ordering::SeqCst)
    }

    async fn wait_for_active_fetches(&self) {
        loop {
            let active_count = self.active_fetch_count().await;
            if active_count == 0 {
                return;
            }

            tracing::debug!(active_count, "Waiting for active fetches to complete");
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }

    /// Start the background task evicting completed jobs older than `registry.job_ttl`
    ///
    /// Does nothing when no TTL is configured. The task stops once shutdown begins.
    pub fn start_job_eviction(&self) -> tokio::task::JoinHandle<()> {
        let Some(ttl) = self.config.registry.job_ttl else {
            tracing::info!("No job TTL configured, skipping job eviction");
            return tokio::spawn(async {});
        };

        let registry = self.registry.clone();
        let accepting_new = self.workers.accepting_new.clone();
        let sweep_interval = self.config.registry.sweep_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            while accepting_new.load(Ordering::SeqCst) {
                ticker.tick().await;

                let cutoff = chrono::Utc::now().timestamp() - ttl.as_secs() as i64;
                let evicted = registry.evict_completed_before(cutoff);
                if evicted > 0 {
                    tracing::info!(evicted, remaining = registry.len(), "Evicted expired jobs");
                }
            }
        });

        tracing::info!(ttl_secs = ttl.as_secs(), "Job eviction background task started");

        handle
    }
}

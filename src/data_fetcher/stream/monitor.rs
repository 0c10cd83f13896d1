use super::core::DataStream;
use super::source::StreamSource;
use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Periodic freshness check for one stream.
///
/// Re-fetches only stale data, and never while the stream is in error or
/// busy. The task is aborted when the monitor is dropped.
pub struct FreshnessMonitor {
    handle: JoinHandle<()>,
}

impl FreshnessMonitor {
    pub fn spawn<S: StreamSource>(stream: DataStream<S>, every: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Some(outcome) = stream.refresh_if_stale(Utc::now()).await {
                    debug!("Background refresh finished: {outcome:?}");
                }
            }
        });
        FreshnessMonitor { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for FreshnessMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

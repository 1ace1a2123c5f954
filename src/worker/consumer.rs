//! Heartbeat shell for one bound consumer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::process::{unix_now, ProcessKey, ProcessRegistry};

/// Long-lived task tracking one consumer's liveness.
///
/// The worker registers itself on start, refreshes its heartbeat on a fixed
/// interval, and honors the cooperative-stop handshake: when its token is
/// cancelled it stops heartbeating, removes its own key, and exits.
pub struct ConsumerWorker {
    key: ProcessKey,
    registry: Arc<ProcessRegistry>,
    heartbeat_interval: Duration,
}

impl ConsumerWorker {
    pub fn new(
        exchange: &str,
        consumer_id: &str,
        registry: Arc<ProcessRegistry>,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            key: ProcessKey::new(exchange, consumer_id),
            registry,
            heartbeat_interval,
        }
    }

    pub fn key(&self) -> &ProcessKey {
        &self.key
    }

    /// Run on the current task until stopped.
    pub async fn run(self) {
        let cancel = self.registry.upsert(&self.key, unix_now());
        if cancel.is_cancelled() {
            // A stop request for this key is still outstanding; do not come
            // up only to be torn down.
            tracing::warn!(key = %self.key, "refusing to start while a stop request is pending");
            return;
        }

        tracing::info!(key = %self.key, "consumer worker started");
        metrics::record_process_count(self.registry.count());
        let mut ticker = tokio::time::interval(self.heartbeat_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.registry.upsert(&self.key, unix_now());
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }

        self.registry.remove(&self.key);
        metrics::record_process_count(self.registry.count());
        tracing::info!(key = %self.key, "consumer worker stopped");
    }

    /// Run as a detached tokio task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

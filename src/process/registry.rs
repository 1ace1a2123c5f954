//! Liveness table for consumer processes.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::process::key::ProcessKey;

/// Copy-out snapshot of one liveness entry.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRecord {
    pub key: ProcessKey,
    /// Unix seconds of the last heartbeat.
    pub last_heartbeat: u64,
}

struct ProcessEntry {
    last_heartbeat: u64,
    cancel: CancellationToken,
}

/// Concurrency-safe table mapping process keys to liveness records.
///
/// Invariant: a key is present if and only if its worker is considered
/// running. There is no separate status field; `remove` is the one and only
/// transition to "stopped", and it is linearizable with respect to `get`
/// and `list` (once `remove` returns, no read observes the key until a new
/// `upsert`).
///
/// Stop handshake: `signal_stop` cancels the entry's token and records the
/// request; the worker reacts by ceasing heartbeats and calling `remove`
/// itself. While a stop request is outstanding and the entry is gone, a
/// stale in-flight heartbeat cannot resurrect the key — `upsert` hands the
/// cancelled token back without inserting.
#[derive(Clone, Default)]
pub struct ProcessRegistry {
    inner: Arc<ProcessRegistryInner>,
}

#[derive(Default)]
struct ProcessRegistryInner {
    entries: DashMap<ProcessKey, ProcessEntry>,
    /// Keys with an outstanding stop request; cleared by the orchestrator
    /// once absence is confirmed or the wait is abandoned.
    stopping: DashMap<ProcessKey, CancellationToken>,
    removals: Notify,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker or refresh its liveness.
    ///
    /// Returns the entry's cancellation token; workers watch it for stop
    /// requests. A heartbeat arriving for a key whose stop request already
    /// completed gets the cancelled token back and the key stays absent.
    pub fn upsert(&self, key: &ProcessKey, heartbeat: u64) -> CancellationToken {
        if let Some(mut entry) = self.inner.entries.get_mut(key) {
            entry.last_heartbeat = heartbeat;
            return entry.cancel.clone();
        }
        if let Some(stopped) = self.inner.stopping.get(key) {
            return stopped.value().clone();
        }
        self.inner
            .entries
            .entry(key.clone())
            .or_insert_with(|| ProcessEntry {
                last_heartbeat: heartbeat,
                cancel: CancellationToken::new(),
            })
            .cancel
            .clone()
    }

    /// Deregister a worker. True if the key was present.
    pub fn remove(&self, key: &ProcessKey) -> bool {
        let removed = self.inner.entries.remove(key).is_some();
        if removed {
            self.inner.removals.notify_waiters();
        }
        removed
    }

    pub fn get(&self, key: &ProcessKey) -> Option<ProcessRecord> {
        self.inner.entries.get(key).map(|e| ProcessRecord {
            key: key.clone(),
            last_heartbeat: e.last_heartbeat,
        })
    }

    /// Snapshot of every live entry.
    pub fn list(&self) -> Vec<ProcessRecord> {
        self.inner
            .entries
            .iter()
            .map(|e| ProcessRecord {
                key: e.key().clone(),
                last_heartbeat: e.value().last_heartbeat,
            })
            .collect()
    }

    pub fn count(&self) -> usize {
        self.inner.entries.len()
    }

    /// Request a worker to stop: cancel its token and remember the request
    /// so late heartbeats cannot re-register the key.
    ///
    /// No-op if the key is not present (already stopped).
    pub fn signal_stop(&self, key: &ProcessKey) {
        if let Some(entry) = self.inner.entries.get(key) {
            self.inner
                .stopping
                .insert(key.clone(), entry.cancel.clone());
            entry.cancel.cancel();
        }
    }

    /// Release an outstanding stop request, allowing the consumer to be
    /// registered again by a future worker.
    pub fn clear_stop(&self, key: &ProcessKey) {
        self.inner.stopping.remove(key);
    }

    /// Wait (bounded) for the key to disappear from the table.
    ///
    /// Returns true once the key is absent, false if `wait` elapsed first.
    pub async fn await_removed(&self, key: &ProcessKey, wait: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            // Register interest before checking, so a removal between the
            // check and the await cannot be missed.
            let notified = self.inner.removals.notified();
            if !self.inner.entries.contains_key(key) {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return !self.inner.entries.contains_key(key);
            }
        }
    }
}

//! Consumer-process liveness subsystem.
//!
//! # Data Flow
//! ```text
//! worker start   → upsert(key, now)        → entry created, token handed out
//! worker tick    → upsert(key, now)        → heartbeat refreshed
//! operator stop  → signal_stop(key)        → token cancelled, request recorded
//! worker exit    → remove(key)             → entry gone, waiters notified
//! orchestrator   → await_removed / count() → bounded confirmation of absence
//! ```
//!
//! # Design Decisions
//! - Presence of a key IS the running/stopped signal; there is no separate
//!   status field to fall out of sync
//! - Stopping is cooperative: the orchestrator cancels and waits, the worker
//!   deregisters itself; entries are never deleted out from under a live
//!   worker

pub mod key;
pub mod registry;

pub use key::ProcessKey;
pub use registry::{ProcessRecord, ProcessRegistry};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as unix seconds, the heartbeat timestamp unit.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

//! Consumer worker runtime.
//!
//! # Design Decisions
//! - A worker owns exactly one process-registry entry and is the only party
//!   that removes it
//! - Stop requests arrive through the entry's cancellation token; the worker
//!   exits its loop, deregisters, and the orchestrator observes absence
//! - Spawning policy (when a consumer gets a worker) lives outside this
//!   crate; this module only provides the runnable shell

pub mod consumer;

pub use consumer::ConsumerWorker;

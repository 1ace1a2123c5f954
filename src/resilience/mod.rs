//! Wait strategies for operations that block on external parties.
//!
//! # Design Decisions
//! - Every wait on the broker or on worker deregistration has a deadline
//! - The drain poll backs off exponentially with jitter instead of spinning
//!   on a fixed sleep

pub mod backoff;

pub use backoff::calculate_backoff;

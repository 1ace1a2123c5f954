//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build gateway + registries → Seed exchanges
//!     → Start API listener
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → API stops accepting → process exits
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Worker stop goes through the process-registry handshake, not through
//!   this broadcast; the broadcast only quiesces the listeners

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

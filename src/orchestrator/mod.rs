//! Reload and status orchestration.
//!
//! # Data Flow
//! ```text
//! Exchange reload:
//!     registry lookup → signal bound consumer keys → bounded wait for
//!     absence → broker reload → report
//!
//! System reload:
//!     broker stop-all → signal every key → backoff drain poll to zero →
//!     re-declare every registered exchange
//!
//! Status:
//!     registry consumers × process presence × broker backlog counts
//! ```
//!
//! # Design Decisions
//! - The consumer-stop phase always precedes the broker reload call
//! - Every wait is bounded and times out into an explicit error; a reload
//!   never proceeds over a still-running worker
//! - Workers are not respawned here; the external spawner observes registry
//!   absence

pub mod reload;
pub mod status;

pub use reload::{ReloadOrchestrator, ReloadSettings};
pub use status::{ConsumerState, ConsumerStatus, StatusReporter};

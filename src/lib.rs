//! Exchange management and orchestration layer for a message-broker backend.
//!
//! Operators declare, update, delete, and reload named exchanges; the
//! manager tracks which consumer workers are bound to each exchange and
//! coordinates safe startup/shutdown of those workers. The broker itself is
//! an external collaborator behind the [`broker::BrokerGateway`] contract.

pub mod api;
pub mod broker;
pub mod config;
pub mod error;
pub mod exchange;
pub mod manager;
pub mod orchestrator;
pub mod process;
pub mod worker;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ManagerConfig;
pub use error::ManagerError;
pub use exchange::{Exchange, ExchangeDefinition, ExchangeMode, ExchangeRegistry};
pub use lifecycle::Shutdown;
pub use manager::ExchangeManager;
pub use process::{ProcessKey, ProcessRegistry};

//! Broker gateway boundary.
//!
//! The core never talks queueing internals; everything broker-side goes
//! through the narrow [`BrokerGateway`] contract. Production uses the HTTP
//! management-API implementation in `http.rs`; tests substitute recording
//! fakes.

pub mod http;

use async_trait::async_trait;

use crate::exchange::ExchangeMode;

pub use http::HttpBrokerGateway;

/// Failure of a single gateway call. Carried verbatim inside
/// `ManagerError::Broker` so operators see the underlying message.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("broker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("broker returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("exchange {0} was never declared through this gateway")]
    UnknownExchange(String),
}

/// Narrow contract to the real broker.
///
/// Implementations perform I/O and may fail or time out independently of
/// each other; callers sequence these calls before any registry mutation.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// Create or re-assert an exchange on the broker.
    async fn declare_exchange(
        &self,
        name: &str,
        mode: ExchangeMode,
        durable: bool,
    ) -> Result<(), BrokerError>;

    /// Delete an exchange from the broker.
    async fn delete_exchange(&self, name: &str) -> Result<(), BrokerError>;

    /// Recreate an exchange in place (drop broker-side state, re-declare).
    async fn reload_exchange(&self, name: &str) -> Result<(), BrokerError>;

    /// Stop every active consumer at the broker level.
    async fn stop_all_consumers(&self) -> Result<(), BrokerError>;

    /// Pending message backlog for one consumer of one exchange.
    async fn count_consumer_messages(
        &self,
        consumer_id: &str,
        exchange: &str,
    ) -> Result<u64, BrokerError>;
}

//! Error taxonomy for the management core.
//!
//! Every operation exposed to the control surface returns `ManagerError` so
//! the HTTP layer can map variants to responses without inspecting strings.
//! Gateway failures keep the underlying `BrokerError` as their source.

use std::time::Duration;

use crate::broker::BrokerError;

/// Errors surfaced by registry, orchestration, and status operations.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// Input rejected before any broker or registry mutation.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// An exchange with this name is already registered.
    #[error("exchange {0} already exists")]
    AlreadyExists(String),

    /// No exchange registered under this name.
    #[error("exchange {0} not found")]
    NotFound(String),

    /// The exchange exists but has no consumer with this id.
    #[error("consumer {consumer} not found on exchange {exchange}")]
    ConsumerNotFound { exchange: String, consumer: String },

    /// A BrokerGateway call failed; the operation was aborted and registry
    /// state left unchanged.
    #[error("broker {operation} failed for exchange {exchange}: {source}")]
    Broker {
        operation: &'static str,
        exchange: String,
        #[source]
        source: BrokerError,
    },

    /// Consumer processes did not deregister within the allotted wait.
    #[error("timed out after {waited:?} waiting for {remaining} consumer process(es) of {scope} to stop")]
    DrainTimeout {
        scope: String,
        waited: Duration,
        remaining: usize,
    },

    /// The broker mutation succeeded but the follow-up registry write did
    /// not. Broker and registry are now inconsistent for this exchange and
    /// need operator reconciliation (re-issue the operation).
    #[error("exchange {exchange}: broker {operation} succeeded but registry update failed ({detail}); broker and registry are out of sync")]
    PartialFailure {
        exchange: String,
        operation: &'static str,
        detail: String,
    },
}

impl ManagerError {
    /// Wrap a gateway failure with the operation and exchange it aborted.
    pub fn broker(operation: &'static str, exchange: impl Into<String>, source: BrokerError) -> Self {
        Self::Broker {
            operation,
            exchange: exchange.into(),
            source,
        }
    }
}

//! Per-consumer status composition.

use std::sync::Arc;

use serde::Serialize;

use crate::broker::BrokerGateway;
use crate::error::ManagerError;
use crate::exchange::ExchangeRegistry;
use crate::process::{ProcessKey, ProcessRegistry};

/// Liveness of one consumer, derived from process-table presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerState {
    Running,
    Stopped,
}

/// One status line per bound consumer.
#[derive(Debug, Clone, Serialize)]
pub struct ConsumerStatus {
    pub exchange: String,
    pub consumer_id: String,
    pub state: ConsumerState,
    /// Unix seconds of the last heartbeat; zero when stopped.
    pub last_heartbeat: u64,
    /// Broker-side backlog depth at query time; zero when the count query
    /// failed (logged, not propagated).
    pub pending: u64,
}

/// Composes registry, process table, and broker backlog into status rows.
pub struct StatusReporter {
    exchanges: Arc<ExchangeRegistry>,
    processes: Arc<ProcessRegistry>,
    gateway: Arc<dyn BrokerGateway>,
}

impl StatusReporter {
    pub fn new(
        exchanges: Arc<ExchangeRegistry>,
        processes: Arc<ProcessRegistry>,
        gateway: Arc<dyn BrokerGateway>,
    ) -> Self {
        Self {
            exchanges,
            processes,
            gateway,
        }
    }

    /// Status of every consumer bound to `name`.
    ///
    /// Status reporting is best-effort: a failing backlog query degrades to
    /// a zero count with a logged warning instead of failing the request.
    pub async fn exchange_status(&self, name: &str) -> Result<Vec<ConsumerStatus>, ManagerError> {
        let consumers = self.exchanges.consumers_of(name)?;
        let mut rows = Vec::with_capacity(consumers.len());

        for consumer in consumers {
            let key = ProcessKey::new(name, &consumer.id);
            let (state, last_heartbeat) = match self.processes.get(&key) {
                Some(record) => (ConsumerState::Running, record.last_heartbeat),
                None => (ConsumerState::Stopped, 0),
            };

            let pending = match self
                .gateway
                .count_consumer_messages(&consumer.id, name)
                .await
            {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(
                        exchange = %name,
                        consumer = %consumer.id,
                        error = %e,
                        "backlog count failed, reporting zero"
                    );
                    0
                }
            };

            rows.push(ConsumerStatus {
                exchange: name.to_string(),
                consumer_id: consumer.id,
                state,
                last_heartbeat,
                pending,
            });
        }

        Ok(rows)
    }
}

//! Exchange-level and system-level reload.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::broker::BrokerGateway;
use crate::error::ManagerError;
use crate::exchange::ExchangeRegistry;
use crate::process::{ProcessKey, ProcessRegistry};
use crate::resilience::calculate_backoff;

/// Bounds and pacing for the two reload waits.
#[derive(Debug, Clone)]
pub struct ReloadSettings {
    /// How long an exchange reload waits for each bound consumer to
    /// deregister before aborting.
    pub consumer_stop_timeout: Duration,
    /// How long a system reload waits for the process table to drain.
    pub drain_timeout: Duration,
    /// Base delay of the drain poll backoff.
    pub drain_base_delay_ms: u64,
    /// Cap of the drain poll backoff.
    pub drain_max_delay_ms: u64,
}

impl Default for ReloadSettings {
    fn default() -> Self {
        Self {
            consumer_stop_timeout: Duration::from_secs(10),
            drain_timeout: Duration::from_secs(30),
            drain_base_delay_ms: 50,
            drain_max_delay_ms: 1000,
        }
    }
}

/// Coordinates consumer quiesce and broker reload.
pub struct ReloadOrchestrator {
    exchanges: Arc<ExchangeRegistry>,
    processes: Arc<ProcessRegistry>,
    gateway: Arc<dyn BrokerGateway>,
    settings: ReloadSettings,
}

impl ReloadOrchestrator {
    pub fn new(
        exchanges: Arc<ExchangeRegistry>,
        processes: Arc<ProcessRegistry>,
        gateway: Arc<dyn BrokerGateway>,
        settings: ReloadSettings,
    ) -> Self {
        Self {
            exchanges,
            processes,
            gateway,
            settings,
        }
    }

    /// Reload one exchange: stop its bound consumers, confirm they are gone,
    /// then recreate the exchange at the broker.
    ///
    /// Consumers are not respawned; the external spawner observes their
    /// absence from the process registry.
    pub async fn reload_exchange(&self, name: &str) -> Result<(), ManagerError> {
        let exchange = self.exchanges.get_by_name(name)?;
        let keys: Vec<ProcessKey> = exchange
            .consumers
            .iter()
            .map(|c| ProcessKey::new(name, &c.id))
            .collect();

        tracing::info!(
            exchange = %name,
            consumers = keys.len(),
            "starting exchange reload"
        );

        for key in &keys {
            self.processes.signal_stop(key);
        }

        let wait = self.settings.consumer_stop_timeout;
        let confirmations = join_all(
            keys.iter()
                .map(|key| self.processes.await_removed(key, wait)),
        )
        .await;

        // Release the stop requests either way; a stuck worker that exits
        // later deregisters on its own, and its consumer may be restarted.
        for key in &keys {
            self.processes.clear_stop(key);
        }

        let remaining = confirmations.iter().filter(|stopped| !**stopped).count();
        if remaining > 0 {
            tracing::warn!(
                exchange = %name,
                remaining,
                waited = ?wait,
                "consumers failed to deregister, aborting reload"
            );
            return Err(ManagerError::DrainTimeout {
                scope: name.to_string(),
                waited: wait,
                remaining,
            });
        }

        self.gateway.reload_exchange(name).await.map_err(|e| {
            tracing::error!(exchange = %name, error = %e, "broker reload failed");
            ManagerError::broker("reload", name, e)
        })?;

        tracing::info!(exchange = %name, "exchange reload complete");
        Ok(())
    }

    /// Reload the whole system: stop every consumer, drain the process
    /// table, then re-declare all registered exchanges at the broker.
    ///
    /// Returns the number of re-declared exchanges.
    pub async fn reload_all(&self) -> Result<usize, ManagerError> {
        tracing::info!("starting system reload");

        self.gateway.stop_all_consumers().await.map_err(|e| {
            tracing::error!(error = %e, "broker stop-all failed");
            ManagerError::broker("stop_all_consumers", "*", e)
        })?;

        // Broker-side stop kills subscriptions; signal the same intent
        // through the registry so in-process workers exit promptly.
        let keys: Vec<ProcessKey> = self.processes.list().into_iter().map(|r| r.key).collect();
        for key in &keys {
            self.processes.signal_stop(key);
        }

        let drained = self.drain_all().await;
        for key in &keys {
            self.processes.clear_stop(key);
        }
        drained?;

        let declared = self.init_exchanges().await?;
        tracing::info!(exchanges = declared, "system reload complete");
        Ok(declared)
    }

    /// Re-declare every registered exchange at the broker. Aborts on the
    /// first gateway failure, leaving registry state untouched.
    pub async fn init_exchanges(&self) -> Result<usize, ManagerError> {
        let exchanges = self.exchanges.list();
        for exchange in &exchanges {
            self.gateway
                .declare_exchange(&exchange.name, exchange.mode, exchange.durable)
                .await
                .map_err(|e| {
                    tracing::error!(exchange = %exchange.name, error = %e, "re-declare failed");
                    ManagerError::broker("declare", exchange.name.clone(), e)
                })?;
            tracing::debug!(exchange = %exchange.name, "re-declared exchange");
        }
        Ok(exchanges.len())
    }

    /// Poll the process table until it is empty, backing off between checks.
    async fn drain_all(&self) -> Result<(), ManagerError> {
        let deadline = tokio::time::Instant::now() + self.settings.drain_timeout;
        let mut attempt: u32 = 0;
        let mut last_seen = usize::MAX;

        loop {
            let remaining = self.processes.count();
            if remaining == 0 {
                tracing::info!("all consumer processes stopped");
                return Ok(());
            }
            if remaining != last_seen {
                tracing::info!(remaining, "waiting for consumer processes to stop");
                last_seen = remaining;
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ManagerError::DrainTimeout {
                    scope: "system".to_string(),
                    waited: self.settings.drain_timeout,
                    remaining,
                });
            }

            attempt = attempt.saturating_add(1);
            let delay = calculate_backoff(
                attempt,
                self.settings.drain_base_delay_ms,
                self.settings.drain_max_delay_ms,
            );
            tokio::time::sleep(delay).await;
        }
    }
}

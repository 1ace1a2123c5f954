//! Operation facade consumed by the control surface.
//!
//! Every mutating operation validates first, touches the broker second, and
//! the registry last. The broker is ground truth: the registry may lag it
//! (a post-broker registry failure is reported as `PartialFailure` for
//! operator reconciliation) but never lead it.

use std::sync::Arc;

use crate::broker::BrokerGateway;
use crate::error::ManagerError;
use crate::exchange::{Consumer, Exchange, ExchangeDefinition, ExchangeRegistry, NewConsumer};
use crate::observability::metrics;
use crate::orchestrator::{ConsumerStatus, ReloadOrchestrator, ReloadSettings, StatusReporter};
use crate::process::ProcessRegistry;

/// Entry point for all operator actions on exchanges and consumers.
///
/// Registries and the gateway are constructor-injected; nothing here reads
/// ambient global state, so the whole facade runs against fakes in tests.
pub struct ExchangeManager {
    exchanges: Arc<ExchangeRegistry>,
    processes: Arc<ProcessRegistry>,
    gateway: Arc<dyn BrokerGateway>,
    orchestrator: ReloadOrchestrator,
    reporter: StatusReporter,
}

impl ExchangeManager {
    pub fn new(
        exchanges: Arc<ExchangeRegistry>,
        processes: Arc<ProcessRegistry>,
        gateway: Arc<dyn BrokerGateway>,
        settings: ReloadSettings,
    ) -> Self {
        let orchestrator = ReloadOrchestrator::new(
            exchanges.clone(),
            processes.clone(),
            gateway.clone(),
            settings,
        );
        let reporter = StatusReporter::new(exchanges.clone(), processes.clone(), gateway.clone());
        Self {
            exchanges,
            processes,
            gateway,
            orchestrator,
            reporter,
        }
    }

    pub fn exchanges(&self) -> &Arc<ExchangeRegistry> {
        &self.exchanges
    }

    pub fn processes(&self) -> &Arc<ProcessRegistry> {
        &self.processes
    }

    /// Declare a new exchange: validate, create at the broker, then record.
    pub async fn declare(&self, def: ExchangeDefinition) -> Result<Exchange, ManagerError> {
        let mode = def.validate()?;
        if self.exchanges.exists(&def.name) {
            return Err(ManagerError::AlreadyExists(def.name));
        }

        self.gateway
            .declare_exchange(&def.name, mode, def.durable)
            .await
            .map_err(|e| {
                tracing::error!(exchange = %def.name, error = %e, "declare failed at broker");
                ManagerError::broker("declare", def.name.clone(), e)
            })?;

        let exchange = Exchange::from_definition(&def, mode);
        match self.exchanges.add(exchange.clone()) {
            Ok(()) => {
                tracing::info!(exchange = %exchange.name, mode = %exchange.mode, "exchange declared");
                metrics::record_operation("declare", "ok");
                metrics::record_exchange_count(self.exchanges.len());
                Ok(exchange)
            }
            Err(e) => Err(ManagerError::PartialFailure {
                exchange: exchange.name,
                operation: "declare",
                detail: e.to_string(),
            }),
        }
    }

    /// Update an existing exchange definition; bound consumers survive.
    pub async fn update(&self, def: ExchangeDefinition) -> Result<Exchange, ManagerError> {
        let mode = def.validate()?;
        if !self.exchanges.exists(&def.name) {
            return Err(ManagerError::NotFound(def.name));
        }

        // Re-declaring asserts the new mode/durability at the broker.
        self.gateway
            .declare_exchange(&def.name, mode, def.durable)
            .await
            .map_err(|e| {
                tracing::error!(exchange = %def.name, error = %e, "update failed at broker");
                ManagerError::broker("declare", def.name.clone(), e)
            })?;

        match self.exchanges.update_by_name(&def.name, &def, mode) {
            Ok(exchange) => {
                tracing::info!(exchange = %exchange.name, "exchange updated");
                metrics::record_operation("update", "ok");
                Ok(exchange)
            }
            Err(e) => Err(ManagerError::PartialFailure {
                exchange: def.name,
                operation: "declare",
                detail: e.to_string(),
            }),
        }
    }

    /// Delete an exchange at the broker, then drop it from the registry.
    ///
    /// Running workers are not stopped here; they outlive the registry
    /// mutation and the external spawner reacts to the registry.
    pub async fn delete(&self, name: &str) -> Result<(), ManagerError> {
        if !self.exchanges.exists(name) {
            return Err(ManagerError::NotFound(name.to_string()));
        }

        self.gateway.delete_exchange(name).await.map_err(|e| {
            tracing::error!(exchange = %name, error = %e, "delete failed at broker");
            ManagerError::broker("delete", name, e)
        })?;

        match self.exchanges.delete_by_name(name) {
            Ok(()) => {
                tracing::info!(exchange = %name, "exchange deleted");
                metrics::record_operation("delete", "ok");
                metrics::record_exchange_count(self.exchanges.len());
                Ok(())
            }
            Err(e) => Err(ManagerError::PartialFailure {
                exchange: name.to_string(),
                operation: "delete",
                detail: e.to_string(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Result<Exchange, ManagerError> {
        self.exchanges.get_by_name(name)
    }

    pub fn list(&self) -> Vec<Exchange> {
        self.exchanges.list()
    }

    pub fn consumers(&self, name: &str) -> Result<Vec<Consumer>, ManagerError> {
        self.exchanges.consumers_of(name)
    }

    /// Bind a consumer to an exchange. Registry-only: the worker's queue
    /// materializes at the broker when the worker subscribes.
    pub fn bind_consumer(&self, name: &str, request: NewConsumer) -> Result<Consumer, ManagerError> {
        let consumer = request.into_consumer()?;
        self.exchanges.bind_consumer(name, consumer.clone())?;
        tracing::info!(exchange = %name, consumer = %consumer.id, "consumer bound");
        metrics::record_operation("bind_consumer", "ok");
        Ok(consumer)
    }

    pub fn unbind_consumer(&self, name: &str, consumer_id: &str) -> Result<(), ManagerError> {
        self.exchanges.unbind_consumer(name, consumer_id)?;
        tracing::info!(exchange = %name, consumer = %consumer_id, "consumer unbound");
        metrics::record_operation("unbind_consumer", "ok");
        Ok(())
    }

    pub async fn status(&self, name: &str) -> Result<Vec<ConsumerStatus>, ManagerError> {
        self.reporter.exchange_status(name).await
    }

    pub async fn reload_exchange(&self, name: &str) -> Result<(), ManagerError> {
        let result = self.orchestrator.reload_exchange(name).await;
        metrics::record_operation(
            "reload_exchange",
            if result.is_ok() { "ok" } else { "error" },
        );
        result
    }

    pub async fn reload_all(&self) -> Result<usize, ManagerError> {
        let result = self.orchestrator.reload_all().await;
        metrics::record_operation("reload_all", if result.is_ok() { "ok" } else { "error" });
        result
    }

    /// Declare every seed definition at startup, broker first, registry
    /// second — the same ordering as the online path.
    pub async fn bootstrap(&self, seeds: &[ExchangeDefinition]) -> Result<(), ManagerError> {
        for seed in seeds {
            let exchange = self.declare(seed.clone()).await?;
            tracing::info!(exchange = %exchange.name, "seeded exchange from config");
        }
        metrics::record_exchange_count(self.exchanges.len());
        Ok(())
    }
}

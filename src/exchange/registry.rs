//! Authoritative in-process store of exchange definitions.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::ManagerError;
use crate::exchange::model::{Consumer, Exchange, ExchangeDefinition, ExchangeMode};

/// Thread-safe registry of exchanges keyed by name.
///
/// The registry enforces identity uniqueness and existence only; field
/// validation belongs to the caller. All reads hand out clones so no caller
/// can mutate a stored exchange through a retained reference.
#[derive(Clone, Default)]
pub struct ExchangeRegistry {
    inner: Arc<DashMap<String, Exchange>>,
}

impl ExchangeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if an exchange with this name is registered.
    pub fn exists(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Register a new exchange. Fails if the name is taken.
    pub fn add(&self, exchange: Exchange) -> Result<(), ManagerError> {
        match self.inner.entry(exchange.name.clone()) {
            Entry::Occupied(_) => Err(ManagerError::AlreadyExists(exchange.name)),
            Entry::Vacant(slot) => {
                slot.insert(exchange);
                Ok(())
            }
        }
    }

    /// Copy out the exchange registered under `name`.
    pub fn get_by_name(&self, name: &str) -> Result<Exchange, ManagerError> {
        self.inner
            .get(name)
            .map(|e| e.value().clone())
            .ok_or_else(|| ManagerError::NotFound(name.to_string()))
    }

    /// Replace the definition fields of an existing exchange, preserving its
    /// bound consumers.
    pub fn update_by_name(
        &self,
        name: &str,
        def: &ExchangeDefinition,
        mode: ExchangeMode,
    ) -> Result<Exchange, ManagerError> {
        let mut entry = self
            .inner
            .get_mut(name)
            .ok_or_else(|| ManagerError::NotFound(name.to_string()))?;
        let exchange = entry.value_mut();
        exchange.mode = mode;
        exchange.durable = def.durable;
        exchange.require_token = def.require_token;
        exchange.token = def.token.clone();
        exchange.comment = def.comment.clone();
        Ok(exchange.clone())
    }

    /// Remove the exchange and its consumers.
    pub fn delete_by_name(&self, name: &str) -> Result<(), ManagerError> {
        self.inner
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ManagerError::NotFound(name.to_string()))
    }

    /// Snapshot of every registered exchange. Order is not significant.
    pub fn list(&self) -> Vec<Exchange> {
        self.inner.iter().map(|e| e.value().clone()).collect()
    }

    /// Number of registered exchanges.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Copy out the consumers bound to `name`.
    pub fn consumers_of(&self, name: &str) -> Result<Vec<Consumer>, ManagerError> {
        self.inner
            .get(name)
            .map(|e| e.value().consumers.clone())
            .ok_or_else(|| ManagerError::NotFound(name.to_string()))
    }

    /// Bind a consumer to an exchange. Consumer ids are unique per exchange.
    pub fn bind_consumer(&self, name: &str, consumer: Consumer) -> Result<(), ManagerError> {
        let mut entry = self
            .inner
            .get_mut(name)
            .ok_or_else(|| ManagerError::NotFound(name.to_string()))?;
        let exchange = entry.value_mut();
        if exchange.consumers.iter().any(|c| c.id == consumer.id) {
            return Err(ManagerError::Validation {
                field: "consumer_id",
                reason: format!("consumer {} already bound to {}", consumer.id, name),
            });
        }
        exchange.consumers.push(consumer);
        Ok(())
    }

    /// Unbind a consumer from an exchange.
    pub fn unbind_consumer(&self, name: &str, consumer_id: &str) -> Result<(), ManagerError> {
        let mut entry = self
            .inner
            .get_mut(name)
            .ok_or_else(|| ManagerError::NotFound(name.to_string()))?;
        let exchange = entry.value_mut();
        let before = exchange.consumers.len();
        exchange.consumers.retain(|c| c.id != consumer_id);
        if exchange.consumers.len() == before {
            return Err(ManagerError::ConsumerNotFound {
                exchange: name.to_string(),
                consumer: consumer_id.to_string(),
            });
        }
        Ok(())
    }
}

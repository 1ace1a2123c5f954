//! Shared fakes for integration testing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use exchange_manager::broker::{BrokerError, BrokerGateway};
use exchange_manager::exchange::ExchangeMode;

/// One recorded gateway invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Declare {
        name: String,
        mode: ExchangeMode,
        durable: bool,
    },
    Delete(String),
    Reload(String),
    StopAll,
    Count {
        exchange: String,
        consumer: String,
    },
}

/// Recording fake: remembers every call and fails on demand.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    pub fail_declare: AtomicBool,
    pub fail_reload: AtomicBool,
    pub fail_count: AtomicBool,
    pub backlog: AtomicU64,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reload_calls_for(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::Reload(n) if n == name))
            .count()
    }

    pub fn declare_calls_for(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::Declare { name: n, .. } if n == name))
            .count()
    }

    pub fn stop_all_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::StopAll))
            .count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn broker_down() -> BrokerError {
        BrokerError::Status {
            status: 503,
            body: "broker unreachable".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl BrokerGateway for RecordingGateway {
    async fn declare_exchange(
        &self,
        name: &str,
        mode: ExchangeMode,
        durable: bool,
    ) -> Result<(), BrokerError> {
        self.record(GatewayCall::Declare {
            name: name.to_string(),
            mode,
            durable,
        });
        if self.fail_declare.load(Ordering::SeqCst) {
            return Err(Self::broker_down());
        }
        Ok(())
    }

    async fn delete_exchange(&self, name: &str) -> Result<(), BrokerError> {
        self.record(GatewayCall::Delete(name.to_string()));
        Ok(())
    }

    async fn reload_exchange(&self, name: &str) -> Result<(), BrokerError> {
        self.record(GatewayCall::Reload(name.to_string()));
        if self.fail_reload.load(Ordering::SeqCst) {
            return Err(Self::broker_down());
        }
        Ok(())
    }

    async fn stop_all_consumers(&self) -> Result<(), BrokerError> {
        self.record(GatewayCall::StopAll);
        Ok(())
    }

    async fn count_consumer_messages(
        &self,
        consumer_id: &str,
        exchange: &str,
    ) -> Result<u64, BrokerError> {
        self.record(GatewayCall::Count {
            exchange: exchange.to_string(),
            consumer: consumer_id.to_string(),
        });
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(Self::broker_down());
        }
        Ok(self.backlog.load(Ordering::SeqCst))
    }
}

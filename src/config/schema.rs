//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config
//! file; every section carries workable defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::exchange::ExchangeDefinition;
use crate::orchestrator::ReloadSettings;

/// Root configuration for the exchange manager.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ManagerConfig {
    /// Control-surface listener settings.
    pub api: ApiConfig,

    /// Broker management-API connection settings.
    pub broker: BrokerConfig,

    /// Bounds and pacing of reload waits.
    pub reload: ReloadConfig,

    /// Consumer worker settings.
    pub worker: WorkerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Exchanges declared at startup (broker first, then registry).
    pub exchanges: Vec<ExchangeDefinition>,
}

/// Control-surface listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Bearer token required on every management request.
    pub api_key: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Broker management-API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Base URL of the broker management API.
    pub api_url: String,

    /// Virtual host the exchanges live in.
    pub vhost: String,

    pub username: String,
    pub password: String,

    /// Timeout for each management-API call in seconds.
    pub timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:15672/api".to_string(),
            vhost: "/".to_string(),
            username: "guest".to_string(),
            password: "guest".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Reload wait bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// How long an exchange reload waits for each bound consumer to stop.
    pub consumer_stop_timeout_secs: u64,

    /// How long a system reload waits for the process table to drain.
    pub drain_timeout_secs: u64,

    /// Base delay of the drain poll backoff in milliseconds.
    pub drain_base_delay_ms: u64,

    /// Cap of the drain poll backoff in milliseconds.
    pub drain_max_delay_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            consumer_stop_timeout_secs: 10,
            drain_timeout_secs: 30,
            drain_base_delay_ms: 50,
            drain_max_delay_ms: 1000,
        }
    }
}

impl ReloadConfig {
    pub fn settings(&self) -> ReloadSettings {
        ReloadSettings {
            consumer_stop_timeout: Duration::from_secs(self.consumer_stop_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
            drain_base_delay_ms: self.drain_base_delay_ms,
            drain_max_delay_ms: self.drain_max_delay_ms,
        }
    }
}

/// Consumer worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Heartbeat interval in seconds.
    pub heartbeat_interval_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

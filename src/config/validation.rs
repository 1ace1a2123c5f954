//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Pure function: a
//! config goes in, every violation comes out — not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::ManagerConfig;

/// A single semantic violation, pointing at the offending field.
#[derive(Debug, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Validate the whole config, collecting every violation.
pub fn validate_config(config: &ManagerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.api.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(invalid(
            "api.bind_address",
            format!("not a socket address: {}", config.api.bind_address),
        ));
    }
    if config.api.api_key.trim().is_empty() {
        errors.push(invalid("api.api_key", "must not be empty"));
    }
    if config.api.request_timeout_secs == 0 {
        errors.push(invalid("api.request_timeout_secs", "must be positive"));
    }

    if url::Url::parse(&config.broker.api_url).is_err() {
        errors.push(invalid(
            "broker.api_url",
            format!("not a url: {}", config.broker.api_url),
        ));
    }
    if config.broker.timeout_secs == 0 {
        errors.push(invalid("broker.timeout_secs", "must be positive"));
    }

    if config.reload.consumer_stop_timeout_secs == 0 {
        errors.push(invalid("reload.consumer_stop_timeout_secs", "must be positive"));
    }
    if config.reload.drain_timeout_secs == 0 {
        errors.push(invalid("reload.drain_timeout_secs", "must be positive"));
    }
    if config.reload.drain_base_delay_ms == 0 {
        errors.push(invalid("reload.drain_base_delay_ms", "must be positive"));
    }
    if config.reload.drain_max_delay_ms < config.reload.drain_base_delay_ms {
        errors.push(invalid(
            "reload.drain_max_delay_ms",
            "must be >= drain_base_delay_ms",
        ));
    }

    if config.worker.heartbeat_interval_secs == 0 {
        errors.push(invalid("worker.heartbeat_interval_secs", "must be positive"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(invalid(
            "observability.metrics_address",
            format!("not a socket address: {}", config.observability.metrics_address),
        ));
    }

    let mut seen = HashSet::new();
    for (i, seed) in config.exchanges.iter().enumerate() {
        let field = format!("exchanges[{}]", i);
        if let Err(e) = seed.validate() {
            errors.push(invalid(field.clone(), e.to_string()));
        }
        if !seen.insert(seed.name.clone()) {
            errors.push(invalid(field, format!("duplicate exchange name {}", seed.name)));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Exchange and consumer data model.

use serde::{Deserialize, Serialize};

use crate::error::ManagerError;

/// Routing discipline of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeMode {
    /// Broadcast to every bound consumer.
    Fanout,
    /// Pattern-matched routing keys.
    Topic,
    /// Exact routing-key match.
    Direct,
}

impl ExchangeMode {
    /// Broker-facing name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeMode::Fanout => "fanout",
            ExchangeMode::Topic => "topic",
            ExchangeMode::Direct => "direct",
        }
    }
}

impl std::str::FromStr for ExchangeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fanout" => Ok(ExchangeMode::Fanout),
            "topic" => Ok(ExchangeMode::Topic),
            "direct" => Ok(ExchangeMode::Direct),
            other => Err(format!(
                "unknown mode {:?}, expected fanout, topic or direct",
                other
            )),
        }
    }
}

impl std::fmt::Display for ExchangeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untyped exchange definition as it arrives from the control surface or a
/// config seed. Validated before anything downstream sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeDefinition {
    /// Globally unique exchange name.
    pub name: String,

    /// Routing mode: "fanout", "topic" or "direct".
    pub mode: String,

    /// Whether the broker persists the exchange across restarts.
    pub durable: bool,

    /// Whether consumers must present the token to bind.
    pub require_token: bool,

    /// Binding token; only meaningful when `require_token` is set.
    pub token: String,

    /// Free-text description, required non-empty.
    pub comment: String,
}

impl Default for ExchangeDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            mode: "fanout".to_string(),
            durable: false,
            require_token: false,
            token: String::new(),
            comment: String::new(),
        }
    }
}

impl ExchangeDefinition {
    /// Boundary validation: non-empty name and comment, known mode.
    ///
    /// Runs before any BrokerGateway call so a bad definition never reaches
    /// the broker or the registry.
    pub fn validate(&self) -> Result<ExchangeMode, ManagerError> {
        if self.name.trim().is_empty() {
            return Err(ManagerError::Validation {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.comment.trim().is_empty() {
            return Err(ManagerError::Validation {
                field: "comment",
                reason: "must not be empty".to_string(),
            });
        }
        self.mode
            .parse::<ExchangeMode>()
            .map_err(|reason| ManagerError::Validation {
                field: "mode",
                reason,
            })
    }
}

/// A consumer identity bound to one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
    /// Unique within the parent exchange.
    pub id: String,

    /// Broker binding pattern; empty means the exchange default.
    #[serde(default)]
    pub route_key: String,

    /// Free-text description.
    #[serde(default)]
    pub comment: String,
}

/// Binding request for a new consumer. The id is generated when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewConsumer {
    pub id: Option<String>,
    pub route_key: String,
    pub comment: String,
}

impl NewConsumer {
    /// Resolve into a stored `Consumer`, generating a UUID id if needed.
    pub fn into_consumer(self) -> Result<Consumer, ManagerError> {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            Some(_) => {
                return Err(ManagerError::Validation {
                    field: "consumer_id",
                    reason: "must not be empty".to_string(),
                })
            }
            None => uuid::Uuid::new_v4().to_string(),
        };
        Ok(Consumer {
            id,
            route_key: self.route_key,
            comment: self.comment,
        })
    }
}

/// A named routing configuration with its bound consumers.
///
/// The name exists in the registry if and only if (normally) the exchange
/// also exists at the broker; mutations go broker-first so the registry may
/// lag the broker, never lead it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub name: String,
    pub mode: ExchangeMode,
    pub durable: bool,
    pub require_token: bool,
    pub token: String,
    pub comment: String,
    /// Bound consumers in binding order; empty at creation.
    #[serde(default)]
    pub consumers: Vec<Consumer>,
}

impl Exchange {
    /// Build a fresh exchange (zero consumers) from a validated definition.
    pub fn from_definition(def: &ExchangeDefinition, mode: ExchangeMode) -> Self {
        Self {
            name: def.name.clone(),
            mode,
            durable: def.durable,
            require_token: def.require_token,
            token: def.token.clone(),
            comment: def.comment.clone(),
            consumers: Vec::new(),
        }
    }
}

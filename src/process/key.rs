//! Deterministic process keys.

use std::fmt;

use serde::Serialize;

/// Identity of one consumer process: exchange name plus consumer id.
///
/// The same two inputs always yield the same key; it is the join point
/// between the exchange registry, worker heartbeats, and stop requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProcessKey(String);

impl ProcessKey {
    pub fn new(exchange: &str, consumer_id: &str) -> Self {
        Self(format!("{}.{}", exchange, consumer_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

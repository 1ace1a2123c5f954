//! BrokerGateway implementation over the broker's HTTP management API.
//!
//! Exchange CRUD maps onto the management API's `exchanges` resource and
//! backlog counts onto the `queues` resource (one queue per consumer, named
//! `{exchange}.{consumer_id}`). `stop_all_consumers` closes every open
//! broker connection through the `connections` resource.

use std::time::Duration;

use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;

use crate::broker::{BrokerError, BrokerGateway};
use crate::config::BrokerConfig;
use crate::exchange::ExchangeMode;

/// Gateway speaking to the broker's management API via reqwest.
pub struct HttpBrokerGateway {
    client: reqwest::Client,
    base_url: url::Url,
    vhost: String,
    username: String,
    password: String,
    /// What this gateway declared, so `reload_exchange` can re-declare
    /// without reaching back into the registry.
    declared: DashMap<String, (ExchangeMode, bool)>,
}

#[derive(Deserialize)]
struct QueueInfo {
    #[serde(default)]
    messages: u64,
}

#[derive(Deserialize)]
struct ConnectionInfo {
    name: String,
}

impl HttpBrokerGateway {
    pub fn new(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = url::Url::parse(&config.api_url).map_err(|e| BrokerError::Status {
            status: 0,
            body: format!("invalid broker api url {}: {}", config.api_url, e),
        })?;
        Ok(Self {
            client,
            base_url,
            vhost: config.vhost.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            declared: DashMap::new(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<url::Url, BrokerError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| BrokerError::Status {
                status: 0,
                body: format!("broker api url {} cannot take a path", self.base_url),
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: url::Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, BrokerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BrokerError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn put_exchange(
        &self,
        name: &str,
        mode: ExchangeMode,
        durable: bool,
    ) -> Result<(), BrokerError> {
        let url = self.endpoint(&["exchanges", &self.vhost, name])?;
        let body = json!({ "type": mode.as_str(), "durable": durable });
        let response = self
            .request(reqwest::Method::PUT, url)
            .json(&body)
            .send()
            .await?;
        Self::expect_success(response).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl BrokerGateway for HttpBrokerGateway {
    async fn declare_exchange(
        &self,
        name: &str,
        mode: ExchangeMode,
        durable: bool,
    ) -> Result<(), BrokerError> {
        self.put_exchange(name, mode, durable).await?;
        self.declared.insert(name.to_string(), (mode, durable));
        Ok(())
    }

    async fn delete_exchange(&self, name: &str) -> Result<(), BrokerError> {
        let url = self.endpoint(&["exchanges", &self.vhost, name])?;
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        Self::expect_success(response).await?;
        self.declared.remove(name);
        Ok(())
    }

    async fn reload_exchange(&self, name: &str) -> Result<(), BrokerError> {
        let (mode, durable) = self
            .declared
            .get(name)
            .map(|e| *e.value())
            .ok_or_else(|| BrokerError::UnknownExchange(name.to_string()))?;

        let url = self.endpoint(&["exchanges", &self.vhost, name])?;
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        // A missing exchange is fine here; the point is a clean re-declare.
        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Self::expect_success(response).await.map(|_| ());
        }
        self.put_exchange(name, mode, durable).await
    }

    async fn stop_all_consumers(&self) -> Result<(), BrokerError> {
        let url = self.endpoint(&["connections"])?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let connections: Vec<ConnectionInfo> =
            Self::expect_success(response).await?.json().await?;

        for connection in connections {
            let url = self.endpoint(&["connections", &connection.name])?;
            let response = self.request(reqwest::Method::DELETE, url).send().await?;
            if let Err(e) = Self::expect_success(response).await {
                tracing::warn!(connection = %connection.name, error = %e, "failed to close broker connection");
            }
        }
        Ok(())
    }

    async fn count_consumer_messages(
        &self,
        consumer_id: &str,
        exchange: &str,
    ) -> Result<u64, BrokerError> {
        let queue = format!("{}.{}", exchange, consumer_id);
        let url = self.endpoint(&["queues", &self.vhost, &queue])?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let info: QueueInfo = Self::expect_success(response).await?.json().await?;
        Ok(info.messages)
    }
}

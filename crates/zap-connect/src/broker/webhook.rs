//! `SessionBroker` over plain HTTP webhooks.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use zap_common::InstanceId;
use zap_config::schema::BrokerConfig;

use super::types::{Instance, InstanceList, PairingResponse, StatusResponse};
use super::{BrokerError, SessionBroker};

/// Broker reached through GET webhooks returning JSON.
pub struct WebhookBroker {
    http: reqwest::Client,
    base_url: String,
    reconnect_endpoint: String,
    status_endpoint: String,
    instances_endpoint: String,
}

impl WebhookBroker {
    pub fn new(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs.into()))
            .timeout(Duration::from_secs(config.request_timeout_secs.into()))
            .user_agent(concat!("zap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BrokerError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            reconnect_endpoint: config.reconnect_endpoint.clone(),
            status_endpoint: config.status_endpoint.clone(),
            instances_endpoint: config.instances_endpoint.clone(),
        })
    }

    /// Join `endpoint` onto the base URL, adding `?id=` when an instance is given.
    pub(crate) fn endpoint_url(&self, endpoint: &str, instance: Option<&InstanceId>) -> String {
        let endpoint = endpoint.trim_matches('/');
        match instance {
            Some(id) => format!(
                "{}/{}?id={}",
                self.base_url,
                endpoint,
                urlencoding::encode(id.as_str())
            ),
            None => format!("{}/{}", self.base_url, endpoint),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, BrokerError> {
        debug!(url = %url, "broker request");

        let response = self
            .http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| BrokerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = text.chars().take(200).collect::<String>();
            return Err(BrokerError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BrokerError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SessionBroker for WebhookBroker {
    async fn request_pairing(&self, instance: &InstanceId) -> Result<PairingResponse, BrokerError> {
        let url = self.endpoint_url(&self.reconnect_endpoint, Some(instance));
        self.get_json(&url).await
    }

    async fn fetch_status(&self, instance: &InstanceId) -> Result<StatusResponse, BrokerError> {
        let url = self.endpoint_url(&self.status_endpoint, Some(instance));
        self.get_json(&url).await
    }

    async fn list_instances(&self) -> Result<Vec<Instance>, BrokerError> {
        let url = self.endpoint_url(&self.instances_endpoint, None);
        let list: InstanceList = self.get_json(&url).await?;
        Ok(list.instances.unwrap_or_default())
    }
}

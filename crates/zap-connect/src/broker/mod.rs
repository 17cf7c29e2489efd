//! Remote session broker.
//!
//! The broker owns the actual WhatsApp sessions. zap only asks it for a
//! pairing artifact, for the current status of an instance, and for the
//! list of instances on the account.

mod types;
mod webhook;

use async_trait::async_trait;
use zap_common::{InstanceId, ZapError};

pub use types::{Instance, InstanceStatus, PairingResponse, RemoteStatus, StatusResponse};
pub use webhook::WebhookBroker;

#[async_trait]
pub trait SessionBroker: Send + Sync {
    /// Ask the broker for a fresh pairing artifact for `instance`.
    async fn request_pairing(&self, instance: &InstanceId) -> Result<PairingResponse, BrokerError>;

    /// Query the current session status of `instance`.
    async fn fetch_status(&self, instance: &InstanceId) -> Result<StatusResponse, BrokerError>;

    /// List every instance on the account.
    async fn list_instances(&self) -> Result<Vec<Instance>, BrokerError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("client error: {0}")]
    Client(String),
}

impl From<BrokerError> for ZapError {
    fn from(err: BrokerError) -> Self {
        ZapError::Broker(err.to_string())
    }
}

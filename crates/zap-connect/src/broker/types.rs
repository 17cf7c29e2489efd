//! Wire types of the broker endpoints.

use serde::{Deserialize, Serialize};
use zap_common::InstanceId;

/// Body of the reconnect endpoint. A missing `qrCode` means the broker
/// could not produce an artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingResponse {
    #[serde(rename = "qrCode", default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

impl PairingResponse {
    pub fn with_artifact(qr_code: impl Into<String>) -> Self {
        Self {
            qr_code: Some(qr_code.into()),
        }
    }

    /// The artifact, ignoring empty strings.
    pub fn artifact(&self) -> Option<&str> {
        self.qr_code.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Body of the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    pub fn remote_status(&self) -> RemoteStatus {
        RemoteStatus::parse(&self.status)
    }
}

/// Interpretation of the free-form status string.
///
/// Only `connected` counts as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    Connected,
    Connecting,
    Other(String),
}

impl RemoteStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "connected" => RemoteStatus::Connected,
            "connecting" => RemoteStatus::Connecting,
            other => RemoteStatus::Other(other.to_string()),
        }
    }
}

/// Connection state of an instance as listed by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceStatus {
    Connected,
    Disconnected,
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    pub fn from_remote(raw: &str) -> Self {
        match raw.trim() {
            "connected" => InstanceStatus::Connected,
            "disconnected" => InstanceStatus::Disconnected,
            _ => InstanceStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Connected => "connected",
            InstanceStatus::Disconnected => "disconnected",
            InstanceStatus::Unknown => "unknown",
        }
    }
}

/// A messaging instance (one WhatsApp number) on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_instance_status")]
    pub status: InstanceStatus,
}

fn default_instance_status() -> InstanceStatus {
    InstanceStatus::Unknown
}

/// Body of the instances endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct InstanceList {
    #[serde(default)]
    pub instances: Option<Vec<Instance>>,
}

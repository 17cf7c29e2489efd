use serde::{Deserialize, Serialize};

/// Remote session broker (webhook) endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Base URL every endpoint is joined onto.
    pub base_url: String,
    /// Endpoint that issues a fresh pairing artifact (`?id=`).
    pub reconnect_endpoint: String,
    /// Endpoint that reports the session status (`?id=`).
    pub status_endpoint: String,
    /// Endpoint that lists the account's instances.
    pub instances_endpoint: String,
    /// Per-request timeout in seconds (valid range: 1-120).
    pub request_timeout_secs: u32,
    /// TCP connect timeout in seconds (valid range: 1-60).
    pub connect_timeout_secs: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5678/webhook".into(),
            reconnect_endpoint: "reconnect".into(),
            status_endpoint: "status".into(),
            instances_endpoint: "instances".into(),
            request_timeout_secs: 15,
            connect_timeout_secs: 5,
        }
    }
}

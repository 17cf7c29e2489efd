use serde::{Deserialize, Serialize};

/// Timing of a pairing attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Seconds a pairing artifact stays valid (valid range: 10-600).
    pub countdown_secs: u32,
    /// Seconds between status polls (valid range: 1-60).
    pub poll_interval_secs: u32,
    /// Hard stop for status polling in seconds (valid range: 10-900).
    pub poll_ceiling_secs: u32,
    /// How long the success state is shown before completion (valid range: 0-10000).
    pub success_delay_ms: u32,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 120,
            poll_interval_secs: 3,
            poll_ceiling_secs: 120,
            success_delay_ms: 2000,
        }
    }
}

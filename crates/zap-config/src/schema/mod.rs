//! Configuration schema types for zap.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod broker;
mod pairing;
mod system;

pub use broker::*;
pub use pairing::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ZapConfig {
    pub broker: BrokerConfig,
    pub pairing: PairingConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

//! Full configuration validation.
//!
//! Validates numeric ranges, timing relationships, and broker URLs.
//! Each check pushes onto a shared error list; the orchestrator folds
//! them into a single `ConfigError`.

mod broker;
mod helpers;
mod ranges;


use crate::schema::ZapConfig;
use zap_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ZapConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    broker::validate_broker(&mut errors, config);
    ranges::validate_broker_timeouts(&mut errors, config);
    ranges::validate_pairing(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

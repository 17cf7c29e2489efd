//! Validation for the `[broker]` section.

use crate::schema::ZapConfig;

use super::helpers::validate_non_empty;

pub(crate) fn validate_broker(errors: &mut Vec<String>, config: &ZapConfig) {
    let broker = &config.broker;

    if !(broker.base_url.starts_with("http://") || broker.base_url.starts_with("https://")) {
        errors.push(format!(
            "broker.base_url = {:?} must start with http:// or https://",
            broker.base_url
        ));
    }

    validate_non_empty(errors, "broker.reconnect_endpoint", &broker.reconnect_endpoint);
    validate_non_empty(errors, "broker.status_endpoint", &broker.status_endpoint);
    validate_non_empty(errors, "broker.instances_endpoint", &broker.instances_endpoint);
}

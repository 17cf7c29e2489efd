//! Range validation for timeouts and pairing timing.

use crate::schema::ZapConfig;

use super::helpers::validate_range;

/// Validate broker timeouts.
pub(crate) fn validate_broker_timeouts(errors: &mut Vec<String>, config: &ZapConfig) {
    validate_range(
        errors,
        "broker.request_timeout_secs",
        config.broker.request_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "broker.connect_timeout_secs",
        config.broker.connect_timeout_secs,
        1,
        60,
    );
}

/// Validate pairing timing and the interval/ceiling relationship.
pub(crate) fn validate_pairing(errors: &mut Vec<String>, config: &ZapConfig) {
    let pairing = &config.pairing;
    validate_range(errors, "pairing.countdown_secs", pairing.countdown_secs, 10, 600);
    validate_range(
        errors,
        "pairing.poll_interval_secs",
        pairing.poll_interval_secs,
        1,
        60,
    );
    validate_range(
        errors,
        "pairing.poll_ceiling_secs",
        pairing.poll_ceiling_secs,
        10,
        900,
    );
    validate_range(
        errors,
        "pairing.success_delay_ms",
        pairing.success_delay_ms,
        0,
        10_000,
    );

    if pairing.poll_interval_secs >= pairing.poll_ceiling_secs {
        errors.push(format!(
            "pairing.poll_interval_secs = {} must be shorter than pairing.poll_ceiling_secs = {}",
            pairing.poll_interval_secs, pairing.poll_ceiling_secs
        ));
    }
}

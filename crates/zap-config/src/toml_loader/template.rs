//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# zap configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[broker]
# base_url = "http://localhost:5678/webhook"
# reconnect_endpoint = "reconnect"   # GET ?id=<instance> -> { "qrCode": "..." }
# status_endpoint = "status"         # GET ?id=<instance> -> { "status": "..." }
# instances_endpoint = "instances"   # GET -> { "instances": [...] }
# request_timeout_secs = 15          # 1-120
# connect_timeout_secs = 5           # 1-60

[pairing]
# countdown_secs = 120               # 10-600
# poll_interval_secs = 3             # 1-60, shorter than the ceiling
# poll_ceiling_secs = 120            # 10-900
# success_delay_ms = 2000            # 0-10000

[storage]
# selection_file = "/path/to/selection.json"

[logging]
# level = "INFO"                     # TRACE, DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}

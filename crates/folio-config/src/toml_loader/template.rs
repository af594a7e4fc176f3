//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# folio configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[presence]
# enabled = true
# url = "wss://api.lanyard.rest/socket"
# user_id = "470904884946796544"
# editor_names = ["Visual Studio Code", "Code", "Zed"]
# connect_timeout_secs = 0    # 0-120, 0 = rely on the transport

[presence.backoff]
# base_delay_ms = 1000        # 100-60000
# max_delay_ms = 30000        # >= base_delay_ms
# max_attempts = 5            # 1-100
# reconnect_grace_ms = 500    # 0-10000

[logging]
# level = "info"              # trace, debug, info, warn, error
"##
    .to_string()
}

//! Default presence settings shared by the config schema and the client.

/// Public relay endpoint.
pub const PRESENCE_URL: &str = "wss://api.lanyard.rest/socket";

/// Account shown on the portfolio.
pub const USER_ID: &str = "470904884946796544";

/// Activity names recognised as code editors.
pub const EDITOR_NAMES: &[&str] = &["Visual Studio Code", "Code", "Zed"];

pub const BACKOFF_BASE_MS: u64 = 1_000;
pub const BACKOFF_CAP_MS: u64 = 30_000;
pub const BACKOFF_MAX_ATTEMPTS: u32 = 5;

/// Pause between the two halves of a manual reconnect.
pub const RECONNECT_GRACE_MS: u64 = 500;

/// Owned copy of [`EDITOR_NAMES`].
pub fn editor_names() -> Vec<String> {
    EDITOR_NAMES.iter().map(|s| s.to_string()).collect()
}

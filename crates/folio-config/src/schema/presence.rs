//! Presence client configuration types.

use serde::{Deserialize, Serialize};

use folio_common::defaults;

/// Presence client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub enabled: bool,
    /// WebSocket URL of the presence relay.
    pub url: String,
    /// Account id sent in the subscribe frame.
    pub user_id: String,
    /// Activity names recognised as code editors, matched exactly.
    pub editor_names: Vec<String>,
    /// Connect timeout in seconds. `0` leaves it to the transport.
    pub connect_timeout_secs: u64,
    pub backoff: BackoffConfig,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: defaults::PRESENCE_URL.into(),
            user_id: defaults::USER_ID.into(),
            editor_names: defaults::editor_names(),
            connect_timeout_secs: 0,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Reconnect policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound for any single retry delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Consecutive failed attempts before giving up.
    pub max_attempts: u32,
    /// Pause between the disconnect and connect halves of a manual reconnect.
    pub reconnect_grace_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: defaults::BACKOFF_BASE_MS,
            max_delay_ms: defaults::BACKOFF_CAP_MS,
            max_attempts: defaults::BACKOFF_MAX_ATTEMPTS,
            reconnect_grace_ms: defaults::RECONNECT_GRACE_MS,
        }
    }
}

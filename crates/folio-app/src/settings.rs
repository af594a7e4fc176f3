//! Turn the loaded config plus CLI overrides into client settings.

use std::time::Duration;

use folio_config::{FolioConfig, PresenceConfig};
use folio_presence::{BackoffPolicy, PresenceClientConfig};

use crate::cli::Args;

/// Apply command-line overrides on top of the file config.
pub fn apply_overrides(config: &mut FolioConfig, args: &Args) {
    if let Some(user_id) = &args.user_id {
        config.presence.user_id = user_id.clone();
    }
    if let Some(url) = &args.url {
        config.presence.url = url.clone();
    }
}

pub fn client_config(presence: &PresenceConfig) -> PresenceClientConfig {
    let backoff = &presence.backoff;
    PresenceClientConfig {
        url: presence.url.clone(),
        user_id: presence.user_id.clone(),
        editor_names: presence.editor_names.clone(),
        backoff: BackoffPolicy {
            base: Duration::from_millis(backoff.base_delay_ms),
            cap: Duration::from_millis(backoff.max_delay_ms),
            max_attempts: backoff.max_attempts,
        },
        reconnect_grace: Duration::from_millis(backoff.reconnect_grace_ms),
        connect_timeout: match presence.connect_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        },
        ..PresenceClientConfig::default()
    }
}

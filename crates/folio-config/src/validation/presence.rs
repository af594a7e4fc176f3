//! Validation for the presence section.

use crate::schema::FolioConfig;

use super::helpers::{validate_not_blank, validate_range};

/// Validate endpoint, target account, and editor allow-list.
pub(crate) fn validate_presence(errors: &mut Vec<String>, config: &FolioConfig) {
    let presence = &config.presence;

    validate_not_blank(errors, "presence.url", &presence.url);
    if !presence.url.is_empty()
        && !(presence.url.starts_with("ws://") || presence.url.starts_with("wss://"))
    {
        errors.push(format!(
            "presence.url = {:?} must use the ws:// or wss:// scheme",
            presence.url
        ));
    }

    validate_not_blank(errors, "presence.user_id", &presence.user_id);
    if !presence.user_id.chars().all(|c| c.is_ascii_digit()) {
        errors.push(format!(
            "presence.user_id = {:?} must be a numeric account id",
            presence.user_id
        ));
    }

    for (i, name) in presence.editor_names.iter().enumerate() {
        validate_not_blank(errors, &format!("presence.editor_names[{i}]"), name);
    }

    validate_range(
        errors,
        "presence.connect_timeout_secs",
        presence.connect_timeout_secs,
        0,
        120,
    );
}

/// Validate the reconnect policy.
pub(crate) fn validate_backoff(errors: &mut Vec<String>, config: &FolioConfig) {
    let backoff = &config.presence.backoff;

    validate_range(
        errors,
        "presence.backoff.base_delay_ms",
        backoff.base_delay_ms,
        100,
        60_000,
    );
    validate_range(
        errors,
        "presence.backoff.max_delay_ms",
        backoff.max_delay_ms,
        100,
        600_000,
    );
    if backoff.max_delay_ms < backoff.base_delay_ms {
        errors.push(format!(
            "presence.backoff.max_delay_ms = {} is below base_delay_ms = {}",
            backoff.max_delay_ms, backoff.base_delay_ms
        ));
    }
    validate_range(
        errors,
        "presence.backoff.max_attempts",
        u64::from(backoff.max_attempts),
        1,
        100,
    );
    validate_range(
        errors,
        "presence.backoff.reconnect_grace_ms",
        backoff.reconnect_grace_ms,
        0,
        10_000,
    );
}

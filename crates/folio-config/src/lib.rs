//! folio configuration system.
//!
//! Provides TOML-based configuration with validation. All config sections
//! use sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use folio_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    BackoffConfig, FolioConfig, LogLevel, LoggingConfig, PresenceConfig, CONFIG_SCHEMA_VERSION,
};

use folio_common::ConfigError;
use std::path::Path;

/// Load config from the platform default path, creating it if missing.
///
/// The result is not validated; run [`validation::validate`] on it.
pub fn load_config() -> Result<FolioConfig, ConfigError> {
    toml_loader::load_default()
}

/// Load config from an explicit path (e.g. a `--config` override).
///
/// Unlike [`load_config`], a missing file is an error rather than
/// being created.
pub fn load_config_from(path: &Path) -> Result<FolioConfig, ConfigError> {
    toml_loader::load_from_path(path)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &FolioConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

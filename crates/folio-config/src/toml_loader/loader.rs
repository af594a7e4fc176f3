//! Reading `config.toml` into a [`FolioConfig`].
//!
//! Loading only parses. Range checks live in [`crate::validation`] and are
//! left to the caller, which can report them once logging is up.

use std::io::ErrorKind;
use std::path::Path;

use folio_common::ConfigError;
use tracing::debug;

use super::paths::{create_default_config, default_config_path};
use crate::schema::FolioConfig;

/// Parse the file at `path`. Missing sections and fields take their defaults.
pub fn load_from_path(path: &Path) -> Result<FolioConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config = toml::from_str::<FolioConfig>(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

    debug!(path = %path.display(), "config parsed");
    Ok(config)
}

/// Like [`load_from_path`], but a missing file is replaced by the commented
/// template and the built-in defaults are returned.
pub fn load_or_create(path: &Path) -> Result<FolioConfig, ConfigError> {
    match load_from_path(path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(path)?;
            Ok(FolioConfig::default())
        }
        loaded => loaded,
    }
}

/// [`load_or_create`] at [`default_config_path`].
pub fn load_default() -> Result<FolioConfig, ConfigError> {
    load_or_create(&default_config_path()?)
}

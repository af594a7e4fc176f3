//! Where `config.toml` lives, and writing the commented template there.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use folio_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

const APP_DIR: &str = "folio";
const FILE_NAME: &str = "config.toml";

/// `<base>/folio/config.toml`.
pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(APP_DIR).join(FILE_NAME)
}

/// The config file under the platform config directory
/// (`~/.config` on Linux, `~/Library/Application Support` on macOS).
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| config_file_in(&base))
        .ok_or(ConfigError::NoConfigDir)
}

/// Write the documented template to `path`, creating parent directories.
///
/// Never overwrites: an existing file is reported as an I/O error.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(default_config_toml().as_bytes())
        .map_err(io_err)?;

    info!(path = %path.display(), "wrote default config");
    Ok(())
}

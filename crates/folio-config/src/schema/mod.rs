//! Configuration schema types for folio.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod logging;
mod presence;

pub use logging::*;
pub use presence::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for folio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct FolioConfig {
    pub presence: PresenceConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================

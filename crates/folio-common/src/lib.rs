pub mod defaults;
pub mod errors;
pub mod events;

pub use errors::{ConfigError, FolioError, PresenceError};
pub use events::{EventBus, PresenceEvent};

pub type Result<T> = std::result::Result<T, FolioError>;

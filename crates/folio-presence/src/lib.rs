pub mod backoff;
pub mod client;
pub mod machine;
pub mod protocol;
pub mod snapshot;

pub use backoff::{Backoff, BackoffPolicy};
pub use client::{PresenceClient, PresenceClientConfig};
pub use machine::{Command, ConnectionState, Input, MachineConfig, Phase, PresenceMachine};
pub use protocol::{
    parse_frame, Activity, DiscordUser, DispatchKind, InboundMessage, OutboundMessage,
    PresenceData, SpotifyData,
};
pub use snapshot::{
    EditorActivity, EditorAllowList, MusicActivity, PresenceSnapshot, PresenceStatus,
    PresenceUser, StatusColor,
};

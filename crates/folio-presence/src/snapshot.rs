//! The view-facing projection of the subscribed account's presence.

use serde::Serialize;
use tracing::debug;

use folio_common::defaults;

use crate::protocol::{Activity, PresenceData};

const AVATAR_CDN: &str = "https://cdn.discordapp.com";
const SPOTIFY_TRACK_URL: &str = "https://open.spotify.com/track";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    #[default]
    Offline,
}

impl PresenceStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "online" => Some(PresenceStatus::Online),
            "idle" => Some(PresenceStatus::Idle),
            "dnd" => Some(PresenceStatus::Dnd),
            "offline" => Some(PresenceStatus::Offline),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Idle => "idle",
            PresenceStatus::Dnd => "dnd",
            PresenceStatus::Offline => "offline",
        }
    }

    pub fn color(&self) -> StatusColor {
        match self {
            PresenceStatus::Online => StatusColor::Active,
            _ => StatusColor::Muted,
        }
    }
}

/// Display tag derived from [`PresenceStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Active,
    #[default]
    Muted,
}

impl StatusColor {
    /// Theme class used by the site templates.
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusColor::Active => "text-catppuccin-gold",
            StatusColor::Muted => "text-catppuccin-subtle",
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresenceUser {
    pub id: String,
    pub username: Option<String>,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
}

impl PresenceUser {
    /// CDN URL for the avatar, falling back to the default embed avatar.
    pub fn avatar_url(&self, size: u32) -> String {
        match &self.avatar {
            Some(hash) => {
                let ext = if hash.starts_with("a_") { "gif" } else { "png" };
                format!("{AVATAR_CDN}/avatars/{}/{hash}.{ext}?size={size}", self.id)
            }
            None => {
                // Legacy accounts index by discriminator, migrated ones by id.
                let index = match self.discriminator.as_deref() {
                    Some(d) if d != "0" => d.parse::<u64>().map(|n| n % 5).unwrap_or(0),
                    _ => self.id.parse::<u64>().map(|n| (n >> 22) % 6).unwrap_or(0),
                };
                format!("{AVATAR_CDN}/embed/avatars/{index}.png")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MusicActivity {
    pub song: Option<String>,
    pub artist: Option<String>,
    pub track_id: Option<String>,
}

impl MusicActivity {
    pub fn track_url(&self) -> Option<String> {
        self.track_id
            .as_ref()
            .map(|id| format!("{SPOTIFY_TRACK_URL}/{id}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditorActivity {
    pub name: String,
    pub details: Option<String>,
    pub state: Option<String>,
}

impl From<&Activity> for EditorActivity {
    fn from(activity: &Activity) -> Self {
        Self {
            name: activity.name.clone(),
            details: activity.details.clone(),
            state: activity.state.clone(),
        }
    }
}

/// Activity names recognised as code editors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorAllowList {
    names: Vec<String>,
}

impl EditorAllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// First activity, in payload order, whose name is on the list.
    pub fn find<'a>(&self, activities: &'a [Activity]) -> Option<&'a Activity> {
        activities.iter().find(|a| self.contains(&a.name))
    }
}

impl Default for EditorAllowList {
    fn default() -> Self {
        Self::new(defaults::EDITOR_NAMES.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Latest known presence of the subscribed account plus connection flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceSnapshot {
    pub user: Option<PresenceUser>,
    pub music: Option<MusicActivity>,
    pub status: PresenceStatus,
    pub status_color: StatusColor,
    pub editor: Option<EditorActivity>,
    pub is_connected: bool,
    pub is_loading: bool,
}

impl Default for PresenceSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            music: None,
            status: PresenceStatus::Offline,
            status_color: StatusColor::Muted,
            editor: None,
            is_connected: false,
            is_loading: true,
        }
    }
}

impl PresenceSnapshot {
    /// Apply a state payload.
    ///
    /// The user is sticky and the status only changes when reported; music
    /// and editor are recomputed from scratch on every payload.
    pub fn apply(&mut self, data: &PresenceData, editors: &EditorAllowList) {
        if let Some(user) = &data.discord_user {
            self.user = Some(PresenceUser {
                id: user.id.clone(),
                username: user.username.clone(),
                discriminator: user.discriminator.clone(),
                avatar: user.avatar.clone(),
            });
        }

        self.music = data.spotify.as_ref().map(|s| MusicActivity {
            song: s.song.clone(),
            artist: s.artist.clone(),
            track_id: s.track_id.clone(),
        });

        if let Some(raw) = data.discord_status.as_deref() {
            match PresenceStatus::parse(raw) {
                Some(status) => {
                    self.status = status;
                    self.status_color = status.color();
                }
                None => debug!(status = raw, "Ignoring unrecognised status"),
            }
        }

        self.editor = data
            .activities
            .as_deref()
            .and_then(|list| editors.find(list))
            .map(EditorActivity::from);
    }
}

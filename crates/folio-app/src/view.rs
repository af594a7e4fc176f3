//! JSON shape printed for each snapshot: the raw projection plus the
//! derived links and theme class the site templates use.

use serde::Serialize;

use folio_presence::PresenceSnapshot;

const AVATAR_SIZE: u32 = 128;

#[derive(Debug, Serialize)]
pub struct PresenceView<'a> {
    #[serde(flatten)]
    pub snapshot: &'a PresenceSnapshot,
    pub status_class: &'static str,
    pub avatar_url: Option<String>,
    pub track_url: Option<String>,
}

impl<'a> PresenceView<'a> {
    pub fn new(snapshot: &'a PresenceSnapshot) -> Self {
        Self {
            snapshot,
            status_class: snapshot.status_color.css_class(),
            avatar_url: snapshot.user.as_ref().map(|u| u.avatar_url(AVATAR_SIZE)),
            track_url: snapshot.music.as_ref().and_then(|m| m.track_url()),
        }
    }

    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

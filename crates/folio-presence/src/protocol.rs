//! Wire types for the Lanyard-style presence socket.
//!
//! Frames are JSON objects `{ "op": <u64>, "t": <string?>, "d": <value?> }`.
//! Only the subset this client needs is modelled: Hello and Dispatch
//! inbound, Subscribe and Heartbeat outbound.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use folio_common::PresenceError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Operation codes.
pub mod opcodes {
    pub const DISPATCH: u64 = 0;
    pub const HELLO: u64 = 1;
    pub const SUBSCRIBE: u64 = 2;
    pub const HEARTBEAT: u64 = 3;
}

/// Dispatch type tags.
pub mod events {
    pub const INIT_STATE: &str = "INIT_STATE";
    pub const PRESENCE_UPDATE: &str = "PRESENCE_UPDATE";
}

/// Close code reserved for a deliberate shutdown; never triggers a retry.
pub const CLOSE_NORMAL: u16 = 1000;

/// Close code used when the peer vanished without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Close code used when a close frame carried no status.
pub const CLOSE_NO_STATUS: u16 = 1005;

// ---------------------------------------------------------------------------
// Presence payload
// ---------------------------------------------------------------------------

/// The `d` payload of an `INIT_STATE` or `PRESENCE_UPDATE` dispatch.
///
/// A key that is missing and a key that is `null` both decode to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PresenceData {
    #[serde(default)]
    pub discord_user: Option<DiscordUser>,
    #[serde(default)]
    pub spotify: Option<SpotifyData>,
    #[serde(default)]
    pub discord_status: Option<String>,
    #[serde(default)]
    pub activities: Option<Vec<Activity>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscordUser {
    #[serde(default)]
    pub id: String,
    pub username: Option<String>,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpotifyData {
    pub song: Option<String>,
    pub artist: Option<String>,
    pub track_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub name: String,
    pub details: Option<String>,
    pub state: Option<String>,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    InitState,
    PresenceUpdate,
}

impl DispatchKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            events::INIT_STATE => Some(DispatchKind::InitState),
            events::PRESENCE_UPDATE => Some(DispatchKind::PresenceUpdate),
            _ => None,
        }
    }
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Hello {
        heartbeat_interval: Duration,
    },
    Dispatch {
        kind: DispatchKind,
        data: PresenceData,
    },
    /// Well-formed but irrelevant to this client (other dispatch types).
    Ignored {
        op: u64,
        tag: Option<String>,
    },
}

#[derive(Deserialize)]
struct RawFrame {
    op: u64,
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    d: Option<Value>,
}

#[derive(Deserialize)]
struct HelloPayload {
    heartbeat_interval: u64,
}

/// Decode one text frame.
pub fn parse_frame(text: &str) -> Result<InboundMessage, PresenceError> {
    let raw: RawFrame =
        serde_json::from_str(text).map_err(|e| PresenceError::MalformedFrame(e.to_string()))?;

    match raw.op {
        opcodes::HELLO => {
            let d = raw
                .d
                .ok_or_else(|| PresenceError::MalformedFrame("hello without payload".into()))?;
            let hello: HelloPayload = serde_json::from_value(d)
                .map_err(|e| PresenceError::MalformedFrame(e.to_string()))?;
            if hello.heartbeat_interval == 0 {
                return Err(PresenceError::MalformedFrame(
                    "heartbeat_interval must be positive".into(),
                ));
            }
            Ok(InboundMessage::Hello {
                heartbeat_interval: Duration::from_millis(hello.heartbeat_interval),
            })
        }
        opcodes::DISPATCH => {
            let Some(kind) = raw.t.as_deref().and_then(DispatchKind::from_tag) else {
                return Ok(InboundMessage::Ignored {
                    op: raw.op,
                    tag: raw.t,
                });
            };
            let d = raw
                .d
                .ok_or_else(|| PresenceError::MalformedFrame("dispatch without payload".into()))?;
            let data: PresenceData = serde_json::from_value(d)
                .map_err(|e| PresenceError::MalformedFrame(e.to_string()))?;
            Ok(InboundMessage::Dispatch { kind, data })
        }
        other => Err(PresenceError::UnsupportedOpcode(other)),
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Subscribe { user_id: String },
    Heartbeat,
}

impl OutboundMessage {
    /// Serialize to the JSON text sent on the socket.
    pub fn encode(&self) -> String {
        match self {
            OutboundMessage::Subscribe { user_id } => serde_json::json!({
                "op": opcodes::SUBSCRIBE,
                "d": { "subscribe_to_id": user_id }
            })
            .to_string(),
            OutboundMessage::Heartbeat => serde_json::json!({ "op": opcodes::HEARTBEAT }).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hello() {
        let msg = parse_frame(r#"{"op":1,"d":{"heartbeat_interval":30000}}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Hello {
                heartbeat_interval: Duration::from_secs(30)
            }
        );
    }

    #[test]
    fn hello_without_interval_is_malformed() {
        let err = parse_frame(r#"{"op":1,"d":{}}"#).unwrap_err();
        assert!(matches!(err, PresenceError::MalformedFrame(_)));

        let err = parse_frame(r#"{"op":1}"#).unwrap_err();
        assert!(matches!(err, PresenceError::MalformedFrame(_)));
    }

    #[test]
    fn hello_with_zero_interval_is_malformed() {
        let err = parse_frame(r#"{"op":1,"d":{"heartbeat_interval":0}}"#).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn parses_init_state() {
        let msg = parse_frame(
            r#"{
                "op": 0,
                "seq": 1,
                "t": "INIT_STATE",
                "d": {
                    "discord_user": {"id": "1", "username": "molishu", "discriminator": "0", "avatar": "abc"},
                    "discord_status": "online",
                    "activities": [{"name": "Code", "details": "Editing main.rs", "type": 0}],
                    "spotify": null,
                    "listening_to_spotify": false
                }
            }"#,
        )
        .unwrap();

        let InboundMessage::Dispatch { kind, data } = msg else {
            panic!("expected dispatch");
        };
        assert_eq!(kind, DispatchKind::InitState);
        let user = data.discord_user.unwrap();
        assert_eq!(user.id, "1");
        assert_eq!(user.username.as_deref(), Some("molishu"));
        assert_eq!(data.discord_status.as_deref(), Some("online"));
        assert!(data.spotify.is_none());
        let activities = data.activities.unwrap();
        assert_eq!(activities[0].name, "Code");
        assert_eq!(activities[0].details.as_deref(), Some("Editing main.rs"));
    }

    #[test]
    fn absent_keys_decode_to_none() {
        let msg = parse_frame(r#"{"op":0,"t":"PRESENCE_UPDATE","d":{"discord_status":"dnd"}}"#)
            .unwrap();
        let InboundMessage::Dispatch { kind, data } = msg else {
            panic!("expected dispatch");
        };
        assert_eq!(kind, DispatchKind::PresenceUpdate);
        assert_eq!(data.discord_status.as_deref(), Some("dnd"));
        assert!(data.discord_user.is_none());
        assert!(data.activities.is_none());
        assert!(data.spotify.is_none());
    }

    #[test]
    fn activity_without_name_still_decodes() {
        let msg =
            parse_frame(r#"{"op":0,"t":"PRESENCE_UPDATE","d":{"activities":[{"type":4}]}}"#)
                .unwrap();
        let InboundMessage::Dispatch { data, .. } = msg else {
            panic!("expected dispatch");
        };
        assert_eq!(data.activities.unwrap()[0].name, "");
    }

    #[test]
    fn unknown_dispatch_type_is_ignored() {
        let msg = parse_frame(r#"{"op":0,"t":"KV_UPDATE","d":{"key":"x"}}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Ignored {
                op: 0,
                tag: Some("KV_UPDATE".into())
            }
        );
    }

    #[test]
    fn dispatch_without_payload_is_malformed() {
        let err = parse_frame(r#"{"op":0,"t":"INIT_STATE"}"#).unwrap_err();
        assert!(matches!(err, PresenceError::MalformedFrame(_)));
    }

    #[test]
    fn dispatch_with_wrong_payload_shape_is_malformed() {
        let err = parse_frame(r#"{"op":0,"t":"INIT_STATE","d":{"activities":"Code"}}"#)
            .unwrap_err();
        assert!(matches!(err, PresenceError::MalformedFrame(_)));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_frame("not json at all").unwrap_err();
        assert!(matches!(err, PresenceError::MalformedFrame(_)));
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let err = parse_frame(r#"{"op":9}"#).unwrap_err();
        assert!(matches!(err, PresenceError::UnsupportedOpcode(9)));
    }

    #[test]
    fn encodes_subscribe() {
        let text = OutboundMessage::Subscribe {
            user_id: "470904884946796544".into(),
        }
        .encode();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["op"], 2);
        assert_eq!(value["d"]["subscribe_to_id"], "470904884946796544");
    }

    #[test]
    fn encodes_heartbeat_without_payload() {
        let text = OutboundMessage::Heartbeat.encode();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["op"], 3);
        assert!(value.get("d").is_none());
    }
}

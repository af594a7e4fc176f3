//! Driver tests against a loopback WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use folio_common::PresenceEvent;

use super::*;
use crate::backoff::BackoffPolicy;
use crate::machine::ConnectionState;
use crate::snapshot::PresenceStatus;

const WAIT: Duration = Duration::from_secs(5);

async fn listen() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    accept_async(stream).await.unwrap()
}

/// Next text frame from the client, parsed as JSON.
async fn next_json(ws: &mut WebSocketStream<TcpStream>) -> Value {
    loop {
        match timeout(WAIT, ws.next()).await.unwrap() {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(text.as_str()).unwrap(),
            Some(Ok(_)) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

async fn send_text(ws: &mut WebSocketStream<TcpStream>, text: &str) {
    ws.send(Message::Text(text.to_string().into())).await.unwrap();
}

fn config(url: String) -> PresenceClientConfig {
    PresenceClientConfig {
        url,
        user_id: "1".into(),
        backoff: BackoffPolicy {
            base: Duration::from_millis(50),
            cap: Duration::from_millis(200),
            max_attempts: 5,
        },
        reconnect_grace: Duration::from_millis(50),
        ..Default::default()
    }
}

#[tokio::test]
async fn subscribes_heartbeats_and_applies_state() {
    let (listener, url) = listen().await;
    let client = PresenceClient::spawn(config(url));
    let mut snapshots = client.subscribe();
    client.connect().await;

    let mut server = accept(&listener).await;
    let subscribe = next_json(&mut server).await;
    assert_eq!(subscribe["op"], 2);
    assert_eq!(subscribe["d"]["subscribe_to_id"], "1");

    send_text(&mut server, r#"{"op":1,"d":{"heartbeat_interval":50}}"#).await;
    send_text(
        &mut server,
        r#"{"op":0,"t":"INIT_STATE","d":{
            "discord_user":{"id":"1","username":"molishu"},
            "discord_status":"online",
            "activities":[{"name":"Spotify"},{"name":"Zed","details":"folio"}],
            "spotify":{"song":"Avril 14th","artist":"Aphex Twin","track_id":"abc"}
        }}"#,
    )
    .await;

    let snapshot = timeout(WAIT, snapshots.wait_for(|s| !s.is_loading))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert!(snapshot.is_connected);
    assert_eq!(snapshot.status, PresenceStatus::Online);
    assert_eq!(snapshot.editor.map(|e| e.name), Some("Zed".to_string()));
    assert_eq!(
        snapshot.music.and_then(|m| m.song),
        Some("Avril 14th".to_string())
    );
    assert_eq!(client.connection_state(), ConnectionState::Connected);

    let heartbeat = next_json(&mut server).await;
    assert_eq!(heartbeat, serde_json::json!({ "op": 3 }));
    let heartbeat = next_json(&mut server).await;
    assert_eq!(heartbeat["op"], 3);

    client.shutdown().await;
}

#[tokio::test]
async fn disconnect_sends_normal_close_and_stays_down() {
    let (listener, url) = listen().await;
    let client = PresenceClient::spawn(config(url));
    let mut events = client.events();
    client.connect().await;

    let mut server = accept(&listener).await;
    next_json(&mut server).await;
    send_text(&mut server, r#"{"op":1,"d":{"heartbeat_interval":30000}}"#).await;

    let mut state = client.watch_state();
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Connected))
        .await
        .unwrap()
        .unwrap();

    client.disconnect().await;

    let close = loop {
        match timeout(WAIT, server.next()).await.unwrap() {
            Some(Ok(Message::Close(frame))) => break frame,
            Some(Ok(_)) => continue,
            other => panic!("expected close frame, got {other:?}"),
        }
    };
    let close = close.unwrap();
    assert_eq!(close.code, CloseCode::Normal);
    assert_eq!(close.reason.as_str(), "Manual disconnect");

    // No automatic reconnect follows a manual disconnect.
    assert!(timeout(Duration::from_millis(300), listener.accept())
        .await
        .is_err());
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    assert!(!client.snapshot().is_connected);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&PresenceEvent::Disconnected { code: 1000 }));
    assert!(!seen
        .iter()
        .any(|e| matches!(e, PresenceEvent::ReconnectScheduled { .. })));

    client.shutdown().await;
}

#[tokio::test]
async fn relay_close_is_answered_before_reconnecting() {
    let (listener, url) = listen().await;
    let client = PresenceClient::spawn(config(url));
    let mut events = client.events();
    client.connect().await;

    let mut server = accept(&listener).await;
    next_json(&mut server).await;
    server
        .close(Some(CloseFrame {
            code: CloseCode::Library(4000),
            reason: "going away".into(),
        }))
        .await
        .unwrap();

    let reply = loop {
        match timeout(WAIT, server.next()).await.unwrap() {
            Some(Ok(Message::Close(frame))) => break frame,
            Some(Ok(_)) => continue,
            other => panic!("expected close reply, got {other:?}"),
        }
    };
    assert_eq!(reply.map(|f| f.code), Some(CloseCode::Library(4000)));

    let mut server = accept(&listener).await;
    assert_eq!(next_json(&mut server).await["op"], 2);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&PresenceEvent::Disconnected { code: 4000 }));
    assert!(seen.contains(&PresenceEvent::ReconnectScheduled {
        attempt: 1,
        delay_ms: 50
    }));

    client.shutdown().await;
}

#[tokio::test]
async fn dropped_connection_reconnects_with_backoff() {
    let (listener, url) = listen().await;
    let client = PresenceClient::spawn(config(url));
    let mut events = client.events();
    client.connect().await;

    let mut server = accept(&listener).await;
    next_json(&mut server).await;
    drop(server);

    let mut server = accept(&listener).await;
    let subscribe = next_json(&mut server).await;
    assert_eq!(subscribe["op"], 2);

    let scheduled = timeout(WAIT, async {
        loop {
            if let PresenceEvent::ReconnectScheduled { attempt, delay_ms } =
                events.recv().await.unwrap()
            {
                return (attempt, delay_ms);
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(scheduled, (1, 50));

    client.shutdown().await;
}

#[tokio::test]
async fn unreachable_relay_gives_up_and_clears_loading() {
    // Bind then release a port so nothing is listening on it.
    let (listener, url) = listen().await;
    drop(listener);

    let mut cfg = config(url);
    cfg.backoff.max_attempts = 2;
    let client = PresenceClient::spawn(cfg);
    let mut events = client.events();
    client.connect().await;

    let attempts = timeout(WAIT, async {
        loop {
            if let PresenceEvent::GaveUp { attempts } = events.recv().await.unwrap() {
                return attempts;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(attempts, 2);

    let snapshot = client.snapshot();
    assert!(!snapshot.is_loading);
    assert!(!snapshot.is_connected);
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);

    client.shutdown().await;
}

#[tokio::test]
async fn manual_reconnect_opens_a_fresh_socket() {
    let (listener, url) = listen().await;
    let client = PresenceClient::spawn(config(url));
    client.connect().await;

    let mut first = accept(&listener).await;
    next_json(&mut first).await;

    client.reconnect().await;

    let mut second = accept(&listener).await;
    let subscribe = next_json(&mut second).await;
    assert_eq!(subscribe["d"]["subscribe_to_id"], "1");

    client.shutdown().await;
}

#[tokio::test]
async fn shutdown_publishes_event_and_stops_driver() {
    let (_listener, url) = listen().await;
    let client = PresenceClient::spawn(config(url));
    let mut events = client.events();

    client.shutdown().await;
    assert_eq!(events.recv().await.unwrap(), PresenceEvent::Shutdown);

    // Calls after shutdown are harmless.
    client.connect().await;
    client.shutdown().await;
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
}

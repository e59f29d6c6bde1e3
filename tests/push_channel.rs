//! End-to-end tests of the WebSocket push channel against a live listener.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use ptz_relay::api;
use ptz_relay::app_state::AppState;
use ptz_relay::command::{Command, CommandAssembler};
use ptz_relay::domain::{Camera, CameraRoster, ControllerContext, LoggingTransport};
use ptz_relay::ws::{BroadcastRegistry, Envelope, SelectedCameraPayload};

type Peer = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server(names: &[&str]) -> (SocketAddr, AppState) {
    let roster = CameraRoster::from_cameras(names.iter().map(|n| Camera::new(*n)));
    let context = ControllerContext::new("pad", roster);
    let registry = Arc::new(BroadcastRegistry::default());
    let assembler = CommandAssembler::new(Arc::clone(&registry), Arc::new(LoggingTransport));
    let state = AppState::new(registry, context, &assembler);
    let app = api::build_app(state.clone(), "/ws");

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, state)
}

async fn connect(addr: SocketAddr) -> Peer {
    let Ok((peer, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    peer
}

async fn wait_for_connections(state: &AppState, expected: usize) {
    for _ in 0..200 {
        if state.registry.connection_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {expected} connections, have {}",
        state.registry.connection_count()
    );
}

async fn next_text(peer: &mut Peer) -> String {
    loop {
        let Ok(frame) = tokio::time::timeout(Duration::from_secs(2), peer.next()).await else {
            panic!("timed out waiting for a message");
        };
        match frame {
            Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

async fn assert_silent(peer: &mut Peer) {
    if let Ok(frame) = tokio::time::timeout(Duration::from_millis(150), peer.next()).await {
        panic!("expected no message, got {frame:?}");
    }
}

fn camera_name(message: &str) -> String {
    let Ok(envelope) = Envelope::decode(message) else {
        panic!("undecodable: {message}");
    };
    let Ok(payload) = envelope.payload_as::<SelectedCameraPayload>() else {
        panic!("unexpected payload: {message}");
    };
    payload.camera_name
}

fn select_command(state: &AppState) -> &dyn Command {
    let Some(command) = state
        .commands
        .iter()
        .find(|c| c.command_name() == "Select camera")
    else {
        panic!("select command missing");
    };
    command.as_ref()
}

#[tokio::test]
async fn selection_reaches_every_peer() {
    let (addr, state) = spawn_server(&["Cam1", "Cam2", "Cam3"]).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_connections(&state, 2).await;

    assert!(select_command(&state).execute(1).is_ok());

    let expected =
        r#"{"type":"event","action":"selectedCameraChanged","payload":{"cameraName":"Cam2"}}"#;
    assert_eq!(next_text(&mut a).await, expected);
    assert_eq!(next_text(&mut b).await, expected);
}

#[tokio::test]
async fn remaining_peer_still_notified_after_other_disconnects() {
    let (addr, state) = spawn_server(&["Cam1"]).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_connections(&state, 2).await;

    assert!(select_command(&state).execute(0).is_ok());
    let first_a = next_text(&mut a).await;
    let first_b = next_text(&mut b).await;
    assert_eq!(first_a, first_b);

    let _ = a.close(None).await;
    wait_for_connections(&state, 1).await;

    let Some(camera) = state.context.roster().get(0) else {
        panic!("camera missing");
    };
    camera.rename("North");
    assert!(select_command(&state).execute(0).is_ok());
    assert_eq!(camera_name(&next_text(&mut b).await), "North");
}

#[tokio::test]
async fn repeated_selection_is_not_rebroadcast() {
    let (addr, state) = spawn_server(&["Cam1", "Cam2"]).await;
    let mut peer = connect(addr).await;
    wait_for_connections(&state, 1).await;

    assert!(select_command(&state).execute(0).is_ok());
    assert!(select_command(&state).execute(0).is_ok());

    assert_eq!(camera_name(&next_text(&mut peer).await), "Cam1");
    assert_silent(&mut peer).await;
}

#[tokio::test]
async fn late_peer_receives_current_selection_first() {
    let (addr, state) = spawn_server(&["Cam1", "Cam2", "Cam3"]).await;
    assert!(select_command(&state).execute(2).is_ok());

    let mut late = connect(addr).await;
    assert_eq!(camera_name(&next_text(&mut late).await), "Cam3");
}

#[tokio::test]
async fn removed_selection_is_not_replayed() {
    let (addr, state) = spawn_server(&["Cam1", "Cam2"]).await;
    assert!(select_command(&state).execute(1).is_ok());
    assert!(state.context.roster().remove_at(1).is_ok());
    assert!(state.context.selected_camera().is_none());

    let mut late = connect(addr).await;
    wait_for_connections(&state, 1).await;
    assert_silent(&mut late).await;
}

#[tokio::test]
async fn garbage_from_peer_is_ignored() {
    let (addr, state) = spawn_server(&["Cam1"]).await;
    let mut peer = connect(addr).await;
    wait_for_connections(&state, 1).await;

    assert!(peer.send(Message::text("not an envelope")).await.is_ok());
    assert!(
        peer.send(Message::text(r#"{"type":"request","action":"hello"}"#))
            .await
            .is_ok()
    );

    assert!(select_command(&state).execute(0).is_ok());
    assert_eq!(camera_name(&next_text(&mut peer).await), "Cam1");
    assert_eq!(state.registry.connection_count(), 1);
}

#[tokio::test]
async fn close_all_disconnects_every_peer() {
    let (addr, state) = spawn_server(&["Cam1"]).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_connections(&state, 2).await;

    state.registry.close_all();
    wait_for_connections(&state, 0).await;

    for peer in [&mut a, &mut b] {
        let Ok(frame) = tokio::time::timeout(Duration::from_secs(2), peer.next()).await else {
            panic!("peer was not closed");
        };
        assert!(matches!(frame, Some(Ok(Message::Close(_))) | None | Some(Err(_))));
    }
}

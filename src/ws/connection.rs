//! Per-connection accept loop.
//!
//! Registers the peer, then multiplexes three sources until the peer goes
//! away: frames from the peer, messages queued by the registry, and the
//! registry's shutdown signal. Only this task writes to the socket, so
//! outbound frames are never interleaved.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use super::messages::Envelope;
use super::registry::{BroadcastRegistry, PeerRegistration};
use crate::domain::ConnectionId;
use crate::error::DispatchError;

/// Keeps `socket` registered in `registry` until the peer closes it.
///
/// A receive error is treated as a close. On exit the peer is deregistered
/// and the close handshake is attempted.
pub async fn accept(registry: Arc<BroadcastRegistry>, socket: WebSocket) {
    let PeerRegistration {
        id,
        mut outbound,
        mut shutdown,
    } = registry.register();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut close_frame: Option<CloseFrame> = None;

    if !*shutdown.borrow_and_update() {
        loop {
            tokio::select! {
                // Incoming frame from the peer
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => handle_text_message(id, text.as_str()),
                        Some(Ok(Message::Close(frame))) => {
                            close_frame = frame;
                            break;
                        }
                        Some(Err(e)) => {
                            tracing::debug!(connection_id = %id, error = %e, "receive failed");
                            break;
                        }
                        None => break,
                        Some(Ok(_)) => {}
                    }
                }
                // Message queued by the registry
                queued = outbound.recv() => {
                    let Some(text) = queued else { break };
                    if let Err(e) = ws_tx.send(Message::text(text)).await {
                        let failure = DispatchError::BroadcastDeliveryFailure {
                            connection_id: id,
                            reason: e.to_string(),
                        };
                        tracing::warn!(error = %failure, "socket write failed");
                        break;
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
    }

    registry.unregister(id);
    if let Err(e) = ws_tx.send(Message::Close(close_frame)).await {
        tracing::debug!(connection_id = %id, error = %e, "close frame not sent");
    }
    if let Err(e) = ws_tx.close().await {
        tracing::debug!(connection_id = %id, error = %e, "socket close failed");
    }
    tracing::debug!(connection_id = %id, "ws connection closed");
}

/// Inbound messages carry no commands yet; anything well-formed is logged
/// and everything else is ignored.
fn handle_text_message(id: ConnectionId, text: &str) {
    if let Some(envelope) = Envelope::try_decode(text) {
        tracing::debug!(
            connection_id = %id,
            kind = ?envelope.kind,
            action = %envelope.action,
            "unsolicited message from peer"
        );
    }
}

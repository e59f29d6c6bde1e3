//! Registry of live push-channel peers.
//!
//! [`BroadcastRegistry`] owns the set of connected peers. Each peer is
//! represented by the sending half of a bounded [`mpsc`] queue; the
//! connection task that owns the socket drains the queue, so exactly one
//! task ever writes to a given socket. Membership, the retained state
//! snapshots and fan-out all go through one mutex, which makes "register
//! and replay the snapshot" atomic with respect to "publish a new
//! snapshot": a peer sees every state message exactly once.
//!
//! Fan-out never awaits. It is safe to call from synchronous command code
//! and from async handlers alike.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};

use crate::domain::ConnectionId;
use crate::error::DispatchError;

/// Default depth of each peer's outbound queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Everything a connection task needs after registering.
#[derive(Debug)]
pub struct PeerRegistration {
    /// Identity of the new entry.
    pub id: ConnectionId,
    /// Messages to write to the socket, in order.
    pub outbound: mpsc::Receiver<String>,
    /// Flips to `true` when the registry is shut down.
    pub shutdown: watch::Receiver<bool>,
}

#[derive(Debug)]
struct Peer {
    tx: mpsc::Sender<String>,
    connected_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RegistryState {
    peers: HashMap<ConnectionId, Peer>,
    retained: BTreeMap<String, String>,
}

/// Process-wide set of push-channel connections.
#[derive(Debug)]
pub struct BroadcastRegistry {
    state: Mutex<RegistryState>,
    shutdown: watch::Sender<bool>,
    queue_capacity: usize,
}

impl BroadcastRegistry {
    /// Creates an empty registry whose peers buffer up to `queue_capacity`
    /// undelivered messages each.
    #[must_use]
    pub fn new(queue_capacity: usize) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            state: Mutex::new(RegistryState::default()),
            shutdown,
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Adds a new peer and queues every retained state snapshot for it.
    ///
    /// The caller owns the returned queue and must call
    /// [`BroadcastRegistry::unregister`] when the connection ends.
    pub fn register(&self) -> PeerRegistration {
        let id = ConnectionId::new();
        let (tx, outbound) = mpsc::channel(self.queue_capacity);
        let mut state = self.lock();

        for (key, message) in &state.retained {
            if let Err(e) = tx.try_send(message.clone()) {
                tracing::warn!(connection_id = %id, key = %key, error = %e, "could not replay state snapshot");
            }
        }

        state.peers.insert(
            id,
            Peer {
                tx,
                connected_at: Utc::now(),
            },
        );
        let total = state.peers.len();
        drop(state);

        tracing::info!(connection_id = %id, total, "peer connected");
        PeerRegistration {
            id,
            outbound,
            shutdown: self.shutdown.subscribe(),
        }
    }

    /// Removes a peer. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let mut state = self.lock();
        let Some(peer) = state.peers.remove(&id) else {
            return false;
        };
        let total = state.peers.len();
        drop(state);

        let seconds = (Utc::now() - peer.connected_at).num_seconds();
        tracing::info!(connection_id = %id, total, seconds, "peer disconnected");
        true
    }

    /// Queues `message` for every open peer.
    ///
    /// Peers whose connection task has already stopped are skipped. A peer
    /// whose queue is full is logged and skipped; delivery to the others
    /// continues. Returns the number of peers the message was queued for.
    pub fn broadcast(&self, message: &str) -> usize {
        let state = self.lock();
        fan_out(&state.peers, message)
    }

    /// Replaces the retained snapshot stored under `key` and broadcasts it.
    ///
    /// Peers that connect later receive the latest snapshot for each key
    /// before anything else.
    pub fn publish_state(&self, key: impl Into<String>, message: String) -> usize {
        let mut state = self.lock();
        let delivered = fan_out(&state.peers, &message);
        state.retained.insert(key.into(), message);
        delivered
    }

    /// Drops the retained snapshot stored under `key`.
    ///
    /// Returns `true` if one was stored.
    pub fn clear_state(&self, key: &str) -> bool {
        self.lock().retained.remove(key).is_some()
    }

    /// Returns the retained snapshot stored under `key`.
    #[must_use]
    pub fn retained_state(&self, key: &str) -> Option<String> {
        self.lock().retained.get(key).cloned()
    }

    /// Returns the number of registered peers.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.lock().peers.len()
    }

    /// Asks every connection task to close its socket.
    ///
    /// Peers deregister themselves as their tasks finish. Connections
    /// accepted afterwards are closed immediately.
    pub fn close_all(&self) {
        let total = self.connection_count();
        tracing::info!(total, "closing all peer connections");
        self.shutdown.send_replace(true);
    }

    /// Returns `true` once [`BroadcastRegistry::close_all`] was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BroadcastRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

fn fan_out(peers: &HashMap<ConnectionId, Peer>, message: &str) -> usize {
    let mut delivered = 0;
    for (id, peer) in peers {
        if peer.tx.is_closed() {
            tracing::debug!(connection_id = %id, "skipping closed peer");
            continue;
        }
        match peer.tx.try_send(message.to_owned()) {
            Ok(()) => delivered += 1,
            Err(e) => {
                let failure = DispatchError::BroadcastDeliveryFailure {
                    connection_id: *id,
                    reason: e.to_string(),
                };
                tracing::warn!(error = %failure, "broadcast delivery failed");
            }
        }
    }
    tracing::debug!(delivered, total = peers.len(), "broadcast fanned out");
    delivered
}

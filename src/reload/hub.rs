//! Live-reload client registry and broadcaster.
//!
//! # Responsibilities
//! - Register and unregister notification clients
//! - Fan out reload frames to every client
//! - Relay custom frames to every client except their originator
//!
//! # Design Decisions
//! - One bounded queue per client; the socket writer task drains it
//! - Delivery uses `try_send`, so a slow client never blocks a broadcast
//! - Closed queues are collected during iteration and removed afterwards
//! - Broadcasting never fails; delivery problems are logged only

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::net::ClientId;
use crate::observability::metrics;
use crate::reload::message::ServerFrame;

/// Frames buffered per client before new frames are dropped for it.
pub const CLIENT_QUEUE_DEPTH: usize = 64;

/// Registry of connected live-reload clients.
#[derive(Debug, Default)]
pub struct LiveReloadHub {
    clients: DashMap<ClientId, mpsc::Sender<String>>,
}

impl LiveReloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client and hand back the receiving end of its queue.
    pub fn connect(&self) -> (ClientId, mpsc::Receiver<String>) {
        let id = ClientId::next();
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_DEPTH);
        self.clients.insert(id, tx);

        let count = self.clients.len();
        metrics::record_live_clients(count);
        tracing::info!(client = %id, clients = count, "Live-reload client connected");
        (id, rx)
    }

    /// Remove a client. Returns false if it was already gone.
    pub fn disconnect(&self, id: ClientId) -> bool {
        let removed = self.clients.remove(&id).is_some();
        if removed {
            let count = self.clients.len();
            metrics::record_live_clients(count);
            tracing::info!(client = %id, clients = count, "Live-reload client disconnected");
        }
        removed
    }

    /// Tell every client that `asset_type:asset_name` changed.
    pub fn broadcast_reload(&self, asset_type: &str, asset_name: &str) -> usize {
        self.broadcast_path(&format!("{}:{}", asset_type, asset_name))
    }

    /// Tell every client to reload `path`.
    pub fn broadcast_path(&self, path: &str) -> usize {
        let text = match ServerFrame::reload(path).to_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(path = path, error = %e, "Failed to encode reload frame");
                return 0;
            }
        };
        let delivered = self.deliver(&text, None);

        metrics::record_reload();
        tracing::info!(path = path, delivered = delivered, "Reload broadcast");
        delivered
    }

    /// Relay a custom payload to every client except `origin`.
    pub fn broadcast_custom(&self, origin: ClientId, payload: &Value) -> usize {
        let text = payload.to_string();
        let delivered = self.deliver(&text, Some(origin));

        tracing::debug!(origin = %origin, delivered = delivered, "Custom frame relayed");
        delivered
    }

    /// Queue a frame for a single client.
    pub fn send_to(&self, id: ClientId, frame: &ServerFrame) -> bool {
        let Some(tx) = self.clients.get(&id).map(|entry| entry.value().clone()) else {
            return false;
        };

        let text = match frame.to_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(client = %id, error = %e, "Failed to encode frame");
                return false;
            }
        };

        match tx.try_send(text) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(client = %id, "Client queue full, frame dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.disconnect(id);
                false
            }
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    fn deliver(&self, text: &str, exclude: Option<ClientId>) -> usize {
        let mut delivered = 0;
        let mut stale = Vec::new();

        for entry in self.clients.iter() {
            let id = *entry.key();
            if Some(id) == exclude {
                continue;
            }
            match entry.value().try_send(text.to_string()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(client = %id, "Client queue full, frame dropped");
                }
                Err(TrySendError::Closed(_)) => stale.push(id),
            }
        }

        // Removing while iterating would deadlock the shard lock.
        for id in stale {
            self.disconnect(id);
        }
        delivered
    }
}

/// Unregisters a client when dropped.
pub struct ClientGuard {
    hub: Arc<LiveReloadHub>,
    id: ClientId,
}

impl ClientGuard {
    pub fn new(hub: Arc<LiveReloadHub>, id: ClientId) -> Self {
        Self { hub, id }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.hub.disconnect(self.id);
    }
}

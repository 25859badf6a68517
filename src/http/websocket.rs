//! Live-reload WebSocket sessions.
//!
//! # Responsibilities
//! - Complete the upgrade handshake and register the client with the hub
//! - Drain the client's hub queue onto the socket
//! - Interpret inbound frames (handshake, info, custom relay)
//!
//! # Data Flow
//! ```text
//! LiveReloadHub ── mpsc queue ──→ send task ──→ socket
//! socket ──→ recv task ──→ Inbound::parse ──→ hub (send_to / broadcast_custom)
//! ```
//!
//! # Design Decisions
//! - One writer task per client; the hub never awaits a socket
//! - Whichever task ends first aborts the other
//! - Registration is held by a guard, so every exit path unregisters

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::net::ClientId;
use crate::reload::hub::{ClientGuard, LiveReloadHub};
use crate::reload::message::{Inbound, ServerFrame};

/// Upgrade handler for `GET /livereload`.
pub async fn livereload_handler(
    State(hub): State<Arc<LiveReloadHub>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, hub))
}

/// Serve one client until either side closes.
pub async fn run_session(socket: WebSocket, hub: Arc<LiveReloadHub>) {
    let (id, mut queue) = hub.connect();
    let guard = ClientGuard::new(hub.clone(), id);
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = queue.recv().await {
            if let Err(e) = sender.send(Message::Text(text.into())).await {
                tracing::debug!(client = %id, error = %e, "Socket write failed");
                break;
            }
        }
    });

    let recv_hub = hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_inbound(&recv_hub, id, text.as_str()),
                Message::Close(_) => break,
                _ => continue,
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    drop(guard);
}

/// Act on one inbound text frame from `id`.
pub fn handle_inbound(hub: &LiveReloadHub, id: ClientId, text: &str) {
    match Inbound::parse(text) {
        Ok(Inbound::Hello) => {
            hub.send_to(id, &ServerFrame::hello());
        }
        Ok(Inbound::Info(info)) => {
            tracing::debug!(client = %id, info = %info, "Client info");
        }
        Ok(Inbound::Custom(payload)) => {
            hub.broadcast_custom(id, &payload);
        }
        Err(e) => {
            tracing::warn!(client = %id, error = %e, "Ignoring malformed frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_is_answered_to_sender_only() {
        let hub = LiveReloadHub::new();
        let (a, mut a_rx) = hub.connect();
        let (_, mut b_rx) = hub.connect();

        handle_inbound(&hub, a, r#"{"command":"hello","protocols":[]}"#);

        assert!(a_rx.try_recv().unwrap().contains("\"hello\""));
        assert!(b_rx.try_recv().is_err());
    }

    #[test]
    fn custom_is_relayed_to_others() {
        let hub = LiveReloadHub::new();
        let (a, mut a_rx) = hub.connect();
        let (_, mut b_rx) = hub.connect();

        handle_inbound(&hub, a, r#"{"type":"sync"}"#);

        assert!(a_rx.try_recv().is_err());
        assert_eq!(b_rx.try_recv().unwrap(), r#"{"type":"sync"}"#);
    }

    #[test]
    fn info_and_garbage_are_not_relayed() {
        let hub = LiveReloadHub::new();
        let (a, _a_rx) = hub.connect();
        let (_, mut b_rx) = hub.connect();

        handle_inbound(&hub, a, r#"{"command":"info","url":"/"}"#);
        handle_inbound(&hub, a, "{{{");

        assert!(b_rx.try_recv().is_err());
        assert_eq!(hub.client_count(), 2);
    }
}

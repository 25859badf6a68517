//! Notification port HTTP surface.
//!
//! # Responsibilities
//! - Expose the live-reload WebSocket endpoint
//! - Answer the welcome request used by browser extensions
//! - Serve the browser client script (`/livereload.js`)
//! - Accept manual change triggers (`POST /changed`, `GET /changed?files=a,b`)

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::websocket::livereload_handler;
use crate::reload::hub::LiveReloadHub;

/// Body of `POST /changed`.
#[derive(Debug, Deserialize)]
pub struct ChangedRequest {
    #[serde(default)]
    pub files: Vec<String>,
}

/// Query of `GET /changed`: comma-separated file list.
#[derive(Debug, Deserialize)]
pub struct ChangedQuery {
    #[serde(default)]
    pub files: String,
}

impl ChangedQuery {
    fn into_files(self) -> Vec<String> {
        self.files
            .split(',')
            .map(str::trim)
            .filter(|file| !file.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Browser client that connects back to `/livereload`.
pub const CLIENT_SCRIPT: &str = include_str!("livereload.js");

/// Reply to `/changed`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChangedResponse {
    pub clients: usize,
    pub files: Vec<String>,
}

/// HTTP server for the notification port.
pub struct NotificationServer {
    router: Router,
}

impl NotificationServer {
    pub fn new(hub: Arc<LiveReloadHub>) -> Self {
        Self {
            router: Self::build_router(hub),
        }
    }

    /// Routes plus tracing, with the hub as state.
    pub fn build_router(hub: Arc<LiveReloadHub>) -> Router {
        Router::new()
            .route("/", get(welcome))
            .route("/livereload", get(livereload_handler))
            .route("/livereload.js", get(client_script))
            .route("/changed", get(changed_query).post(changed))
            .with_state(hub)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Notification server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Notification server stopped");
        Ok(())
    }
}

async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "livereload": "Welcome",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn client_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CLIENT_SCRIPT,
    )
}

async fn changed(
    State(hub): State<Arc<LiveReloadHub>>,
    Json(request): Json<ChangedRequest>,
) -> Json<ChangedResponse> {
    Json(notify_files(&hub, request.files))
}

async fn changed_query(
    State(hub): State<Arc<LiveReloadHub>>,
    Query(query): Query<ChangedQuery>,
) -> Json<ChangedResponse> {
    Json(notify_files(&hub, query.into_files()))
}

fn notify_files(hub: &LiveReloadHub, files: Vec<String>) -> ChangedResponse {
    for file in &files {
        hub.broadcast_path(file);
    }

    ChangedResponse {
        clients: hub.client_count(),
        files,
    }
}

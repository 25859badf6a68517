//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use devserve::{start, CompileEvents, RunningServer, ServerConfig, Shutdown};
use futures_util::StreamExt;
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A temporary site root with a `public` base directory.
pub struct Site {
    pub root: TempDir,
}

impl Site {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("public")).unwrap();
        Self { root }
    }

    /// Write `contents` to `relative` under the root, creating directories.
    pub fn file(self, relative: &str, contents: &str) -> Self {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Configuration rooted here, on ephemeral ports.
    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            asset_port: 0,
            notify_port: 0,
            root_dir: self.path().to_path_buf(),
            ..ServerConfig::default()
        }
    }
}

/// A started server plus the handles needed to drive it.
pub struct TestServer {
    pub server: RunningServer,
    pub events: CompileEvents,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub async fn start(config: &ServerConfig) -> Self {
        let events = CompileEvents::default();
        let shutdown = Shutdown::new();
        let server = start(config, &events, &shutdown).await.unwrap();
        Self { server, events, shutdown }
    }

    pub fn asset_url(&self, path: &str) -> String {
        format!("http://{}{}", local(self.server.asset_addr()), path)
    }

    pub fn notify_url(&self, path: &str) -> String {
        format!("http://{}{}", local(self.server.notify_addr()), path)
    }

    /// Open a live-reload socket and wait until the hub has registered it.
    pub async fn connect(&self) -> Client {
        let expected = self.server.hub().client_count() + 1;
        let url = format!("ws://{}/livereload", local(self.server.notify_addr()));
        let (client, _) = tokio_tungstenite::connect_async(url).await.unwrap();

        wait_until(|| self.server.hub().client_count() >= expected).await;
        client
    }
}

fn local(addr: SocketAddr) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], addr.port()))
}

/// Poll `condition` for up to five seconds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("condition not met in time");
}

/// Next text frame as JSON, failing after two seconds.
pub async fn next_json(client: &mut Client) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Assert that no frame arrives within a short window.
pub async fn assert_silent(client: &mut Client) {
    let next = tokio::time::timeout(Duration::from_millis(300), client.next()).await;
    assert!(next.is_err(), "unexpected frame: {:?}", next);
}

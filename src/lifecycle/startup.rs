//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration and compile routing rules
//! - Bind the asset port, then the notification port
//! - Wire compile events into the live-reload hub
//! - Spawn both servers and the optional output watcher
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned before a server task runs
//! - Rules are compiled before anything is bound
//! - A busy asset port means the notification port is never touched

use notify::RecommendedWatcher;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::config::{validate_config, ConfigError, ServerConfig};
use crate::events::{AssetCompiled, CompileEvents, OutputWatcher};
use crate::http::AssetServer;
use crate::lifecycle::Shutdown;
use crate::net::{self, BindError};
use crate::reload::{LiveReloadHub, NotificationServer};
use crate::routing::RequestRouter;

/// Error type for server startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("Failed to watch output directory: {0}")]
    Watch(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Handles to a started server.
pub struct RunningServer {
    asset_addr: SocketAddr,
    notify_addr: SocketAddr,
    hub: Arc<LiveReloadHub>,
    asset_task: JoinHandle<io::Result<()>>,
    notify_task: JoinHandle<io::Result<()>>,
    forwarder: JoinHandle<()>,
    _watcher: Option<RecommendedWatcher>,
}

impl RunningServer {
    pub fn asset_addr(&self) -> SocketAddr {
        self.asset_addr
    }

    pub fn notify_addr(&self) -> SocketAddr {
        self.notify_addr
    }

    pub fn hub(&self) -> &Arc<LiveReloadHub> {
        &self.hub
    }

    /// Wait for both servers and the forwarder to stop.
    pub async fn wait(self) -> io::Result<()> {
        let asset = join(self.asset_task).await;
        let notify = join(self.notify_task).await;
        if let Err(e) = self.forwarder.await {
            tracing::warn!(error = %e, "Event forwarder ended abnormally");
        }
        asset.and(notify)
    }
}

async fn join(task: JoinHandle<io::Result<()>>) -> io::Result<()> {
    task.await.map_err(io::Error::other)?
}

/// Start the asset and notification servers.
pub async fn start(
    config: &ServerConfig,
    events: &CompileEvents,
    shutdown: &Shutdown,
) -> Result<RunningServer, StartupError> {
    validate_config(config).map_err(ConfigError::Validation)?;
    let router = Arc::new(RequestRouter::from_config(config)?);

    let asset_listener = net::bind(config.asset_port).await?;
    let notify_listener = net::bind(config.notify_port).await?;
    let asset_addr = asset_listener.local_addr()?;
    let notify_addr = notify_listener.local_addr()?;

    let watcher = if config.watch.enabled {
        Some(OutputWatcher::new(config.base_path(), events.clone()).run()?)
    } else {
        None
    };

    let hub = Arc::new(LiveReloadHub::new());
    let forwarder = spawn_forwarder(hub.clone(), events.subscribe(), shutdown.subscribe());

    let asset_server = AssetServer::new(config, router);
    let asset_task = tokio::spawn(asset_server.run(asset_listener, shutdown.subscribe()));

    let notify_server = NotificationServer::new(hub.clone());
    let notify_task = tokio::spawn(notify_server.run(notify_listener, shutdown.subscribe()));

    tracing::info!(
        asset = %asset_addr,
        notify = %notify_addr,
        root = ?config.root_dir,
        base = %config.base_dir,
        watch = config.watch.enabled,
        "devserve ready"
    );

    Ok(RunningServer {
        asset_addr,
        notify_addr,
        hub,
        asset_task,
        notify_task,
        forwarder,
        _watcher: watcher,
    })
}

/// Forward compile events to the hub until shutdown.
fn spawn_forwarder(
    hub: Arc<LiveReloadHub>,
    mut events: broadcast::Receiver<AssetCompiled>,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                event = events.recv() => match event {
                    Ok(event) => {
                        hub.broadcast_reload(&event.asset_type, &event.asset_name);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped = skipped, "Compile events lagged, some reloads skipped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        tracing::debug!("Event forwarder stopped");
    })
}

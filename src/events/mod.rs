//! Asset compilation events.
//!
//! # Data Flow
//! ```text
//! Asset compilers / OutputWatcher
//!     → CompileEvents::publish(type, name)
//!     → tokio broadcast channel
//!     → forwarder task (lifecycle::startup)
//!     → LiveReloadHub::broadcast_reload
//! ```
//!
//! # Design Decisions
//! - Publishing never fails, even with no subscriber
//! - Slow subscribers lag and skip; events are not persisted

pub mod watcher;

pub use watcher::OutputWatcher;

use tokio::sync::broadcast;

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// One compiled output, e.g. `languages:en`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCompiled {
    pub asset_type: String,
    pub asset_name: String,
}

impl AssetCompiled {
    pub fn new(asset_type: impl Into<String>, asset_name: impl Into<String>) -> Self {
        Self {
            asset_type: asset_type.into(),
            asset_name: asset_name.into(),
        }
    }

    /// Path carried by the reload frame.
    pub fn reload_path(&self) -> String {
        format!("{}:{}", self.asset_type, self.asset_name)
    }
}

/// Publish/subscribe bus for [`AssetCompiled`] events.
#[derive(Debug, Clone)]
pub struct CompileEvents {
    tx: broadcast::Sender<AssetCompiled>,
}

impl CompileEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Announce a compiled asset. Returns the number of subscribers reached.
    pub fn publish(&self, asset_type: &str, asset_name: &str) -> usize {
        self.send(AssetCompiled::new(asset_type, asset_name))
    }

    pub fn send(&self, event: AssetCompiled) -> usize {
        tracing::debug!(asset = %event.reload_path(), "Asset compiled");
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AssetCompiled> {
        self.tx.subscribe()
    }
}

impl Default for CompileEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

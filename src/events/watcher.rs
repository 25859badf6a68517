//! Output directory watcher.
//!
//! Turns file writes under the served base directory into
//! [`AssetCompiled`] events, so external build tools need no integration
//! beyond writing their output.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::events::{AssetCompiled, CompileEvents};

/// Watches a directory tree and publishes compile events.
pub struct OutputWatcher {
    dir: PathBuf,
    events: CompileEvents,
}

impl OutputWatcher {
    pub fn new(dir: impl Into<PathBuf>, events: CompileEvents) -> Self {
        Self {
            dir: dir.into(),
            events,
        }
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let base = self.dir.canonicalize().unwrap_or_else(|_| self.dir.clone());
        let events = self.events.clone();
        let root = base.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    for path in event.paths.iter().filter(|p| !p.is_dir()) {
                        if let Some(compiled) = classify(&root, path) {
                            events.send(compiled);
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&base, RecursiveMode::Recursive)?;

        tracing::info!(path = ?base, "Output watcher started");
        Ok(watcher)
    }
}

/// Map a written file to its asset type and name.
///
/// `languages/en.json` under `base` becomes `languages:en`; a top-level
/// `app.js` becomes `js:app`.
pub fn classify(base: &Path, path: &Path) -> Option<AssetCompiled> {
    let relative = path
        .strip_prefix(base)
        .ok()
        .map(Path::to_path_buf)
        .or_else(|| {
            let canonical = path.canonicalize().ok()?;
            canonical.strip_prefix(base).ok().map(Path::to_path_buf)
        })?;

    let name = relative.file_stem()?.to_str()?;
    let mut components = relative.components();
    let first = components.next()?.as_os_str().to_str()?;

    let asset_type = if components.next().is_some() {
        first
    } else {
        relative.extension()?.to_str()?
    };

    Some(AssetCompiled::new(asset_type, name))
}

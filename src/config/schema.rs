//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev server.
//! All types derive Serde traits for deserialization from config files.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Root configuration for the development server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port serving static assets.
    pub asset_port: u16,

    /// Port serving the live-reload notification channel.
    pub notify_port: u16,

    /// Directory static files are served from.
    pub root_dir: PathBuf,

    /// Directory under `root_dir` that un-rewritten URLs map into.
    pub base_dir: String,

    /// Favicon location, relative to `root_dir/base_dir`.
    pub favicon_path: PathBuf,

    /// File extension (without dot) to MIME type.
    pub mime_overrides: HashMap<String, String>,

    /// URL pattern to replacement path with `$N` tokens, in declaration order.
    pub rewrite_rules: IndexMap<String, String>,

    /// URL pattern to render action, in declaration order.
    pub template_rules: IndexMap<String, RouteAction>,

    /// Output directory watching.
    pub watch: WatchConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            asset_port: 5000,
            notify_port: 35729,
            root_dir: PathBuf::from("."),
            base_dir: "public".to_string(),
            favicon_path: PathBuf::from("images/favicon.ico"),
            mime_overrides: HashMap::new(),
            rewrite_rules: IndexMap::new(),
            template_rules: IndexMap::new(),
            watch: WatchConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Filesystem location of the base directory.
    pub fn base_path(&self) -> PathBuf {
        self.root_dir.join(&self.base_dir)
    }

    /// Filesystem location of the favicon.
    pub fn favicon_file(&self) -> PathBuf {
        self.base_path().join(&self.favicon_path)
    }
}

/// Watches the base directory and publishes compile events for changed files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Enable the output watcher.
    pub enabled: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}

/// Synchronous renderer producing a full response body.
pub type Renderer = Arc<dyn Fn() -> String + Send + Sync>;

/// What a matched template rule does.
///
/// Chosen once when the configuration is loaded. A rule whose value cannot be
/// rendered is kept as `PassThrough` and behaves as if it never matched.
#[derive(Clone, Deserialize)]
#[serde(from = "TemplateValue")]
pub enum RouteAction {
    /// Invoke the renderer and answer with its output.
    Render(Renderer),
    /// Ignore the match and fall through to rewrite rules.
    PassThrough,
}

impl RouteAction {
    /// Build a render action from a closure.
    pub fn render<F>(renderer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Render(Arc::new(renderer))
    }

    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

impl fmt::Debug for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(_) => f.write_str("Render(..)"),
            Self::PassThrough => f.write_str("PassThrough"),
        }
    }
}

/// Raw template rule value as written in the config file.
#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateValue {
    Body { body: String },
    Other(toml::Value),
}

impl From<TemplateValue> for RouteAction {
    fn from(value: TemplateValue) -> Self {
        match value {
            TemplateValue::Body { body } => RouteAction::render(move || body.clone()),
            TemplateValue::Other(_) => RouteAction::PassThrough,
        }
    }
}

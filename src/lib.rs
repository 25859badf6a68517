//! Development static server with regex URL rewriting and live reload.

pub mod config;
pub mod events;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod reload;
pub mod routing;

pub use config::ServerConfig;
pub use events::CompileEvents;
pub use http::AssetServer;
pub use lifecycle::{start, RunningServer, Shutdown, StartupError};
pub use reload::LiveReloadHub;

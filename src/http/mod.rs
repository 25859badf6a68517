//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Asset port:
//!     server.rs (favicon middleware)
//!     → server.rs (routing middleware → RequestRouter)
//!     → ServeDir fallback
//!     → response.rs (no-cache, redirect restore, MIME override)
//!
//! Notification port:
//!     websocket.rs (upgrade, per-client session)
//! ```

pub mod response;
pub mod server;
pub mod websocket;

pub use server::{AssetServer, AssetState};

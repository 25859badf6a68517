//! Live-reload notification subsystem.
//!
//! # Data Flow
//! ```text
//! Browser ── WebSocket /livereload ──→ server.rs
//!     → hub.rs (register ClientId + bounded queue)
//!
//! CompileEvents forwarder / POST /changed
//!     → hub.rs broadcast_reload / broadcast_path
//!     → message.rs (ServerFrame JSON)
//!     → every client queue
//!
//! Client custom frame
//!     → message.rs (Inbound::parse)
//!     → hub.rs broadcast_custom (all but the sender)
//! ```
//!
//! # Design Decisions
//! - A single hub instance, shared by Arc, no globals
//! - Best effort: no acknowledgement, no replay for late joiners

pub mod hub;
pub mod message;
pub mod server;

pub use hub::{ClientGuard, LiveReloadHub};
pub use message::{Inbound, ServerFrame};
pub use server::NotificationServer;

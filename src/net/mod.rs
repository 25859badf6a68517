//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServerBootstrap
//!     → listener.rs (bind asset port, then notification port)
//!     → hand TcpListener to axum::serve
//!
//! WebSocket upgrade on the notification port
//!     → connection.rs (assign ClientId)
//!     → registered in the live-reload hub
//! ```
//!
//! # Design Decisions
//! - Bind failures are classified so the fatal message can name the port
//! - Client IDs are process-unique and never reused

pub mod connection;
pub mod listener;

pub use connection::ClientId;
pub use listener::{bind, BindError};

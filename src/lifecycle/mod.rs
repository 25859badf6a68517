//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Compile rules → Bind asset port → Bind notify port
//!     → Spawn forwarder, asset server, notification server
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → servers drain and exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: rules first, listeners last
//! - Any startup failure is fatal; there is no retry

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
pub use startup::{start, RunningServer, StartupError};

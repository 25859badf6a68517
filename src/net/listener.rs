//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind the asset and notification ports on all interfaces
//! - Distinguish "port in use" from other bind failures
//!
//! # Design Decisions
//! - No retry and no port hopping: a busy port is an operator problem
//! - Port 0 binds an ephemeral port (used by tests)

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener binding.
#[derive(Debug, Error)]
pub enum BindError {
    /// Another process already listens on the port.
    #[error("Port {port} is already in use by another process.")]
    InUse { port: u16 },

    /// Any other OS failure while binding.
    #[error("Failed to bind port {port}: {source}")]
    Io {
        port: u16,
        #[source]
        source: io::Error,
    },
}

impl BindError {
    /// The port that could not be bound.
    pub fn port(&self) -> u16 {
        match self {
            BindError::InUse { port } | BindError::Io { port, .. } => *port,
        }
    }
}

/// Bind `0.0.0.0:port`.
pub async fn bind(port: u16) -> Result<TcpListener, BindError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

    let listener = TcpListener::bind(addr).await.map_err(|source| classify(port, source))?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| BindError::Io { port, source })?;

    tracing::debug!(address = %local_addr, "Listener bound");
    Ok(listener)
}

fn classify(port: u16, source: io::Error) -> BindError {
    if source.kind() == io::ErrorKind::AddrInUse {
        BindError::InUse { port }
    } else {
        BindError::Io { port, source }
    }
}

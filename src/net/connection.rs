//! Notification client identity.
//!
//! # Responsibilities
//! - Generate unique client IDs for the live-reload hub
//! - Provide a loggable, comparable handle for exclude-self broadcasts

use std::sync::atomic::{AtomicU64, Ordering};

/// Global atomic counter for client IDs.
/// Relaxed ordering is enough since only uniqueness matters.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of one notification connection.
///
/// Only compared and hashed; it never owns the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    /// Generate a new unique client ID.
    pub fn next() -> Self {
        Self(CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

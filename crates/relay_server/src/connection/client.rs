//! Client connection representation.
//!
//! This module defines the per-connection metadata tracked by the
//! connection manager.

use std::net::SocketAddr;
use std::time::SystemTime;

/// Represents an individual client connection to the server.
///
/// Identity (client id, auth token) is not stored here; it lives in the
/// client registry once the client authenticates via `joinGameClient`.
#[derive(Debug)]
pub struct ClientConnection {
    /// The remote network address of the client
    pub remote_addr: SocketAddr,

    /// When this connection was established
    pub connected_at: SystemTime,
}

impl ClientConnection {
    /// Creates a new client connection with the specified remote address,
    /// recording the current time as the connection timestamp.
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            remote_addr,
            connected_at: SystemTime::now(),
        }
    }
}

//! Server configuration types and defaults.
//!
//! This module contains the relay server configuration structure and default
//! values used to initialize and customize server behavior.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Configuration structure for the relay server.
///
/// Contains all necessary parameters to configure server behavior including
/// the client-facing bind address, the upstream game-logic process address,
/// and connection limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The socket address to bind the client-facing WebSocket listener to
    pub bind_address: SocketAddr,

    /// The socket address of the authoritative game-logic process
    pub upstream_address: SocketAddr,

    /// Maximum number of concurrent client connections allowed
    pub max_connections: usize,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Whether to use SO_REUSEPORT for multi-threaded accept loops
    pub use_reuse_port: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().expect("Invalid default bind address"),
            upstream_address: "127.0.0.1:9000"
                .parse()
                .expect("Invalid default upstream address"),
            max_connections: 1000,
            connection_timeout: 60,
            use_reuse_port: false,
        }
    }
}

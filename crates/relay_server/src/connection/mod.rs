//! Client connection management.
//!
//! Tracks WebSocket connections, assigns numeric connection ids, and
//! delivers outbound messages. Connection ids are the only thing other
//! modules may hold on to; live WebSocket handles never leave this module.

pub mod client;
pub mod manager;
pub mod response;

pub use client::ClientConnection;
pub use manager::ConnectionManager;
pub use response::{ClientResponseSender, WsResponseSender};

/// Numeric identifier for one accepted connection, unique for the lifetime
/// of the process.
pub type ConnectionId = usize;

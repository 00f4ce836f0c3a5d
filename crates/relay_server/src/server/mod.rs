//! Server core and connection lifecycle.

pub mod core;
pub mod handlers;

pub use core::RelayServer;
pub use handlers::handle_connection;

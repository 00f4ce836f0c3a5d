//! # Relay Server - Gateway Tier Infrastructure
//!
//! A relay/gateway server for a multiplayer world: it terminates client
//! WebSocket connections, transcodes typed events, and relays them to and
//! from a single authoritative upstream game-logic process over a
//! newline-framed JSON TCP link. The upstream process stays authoritative
//! for all game state; this tier caches what it is pushed and answers or
//! broadcasts per the delivery policy of each event.
//!
//! ## Architecture Overview
//!
//! ### Core Components
//!
//! * **Connection Manager** - WebSocket lifecycle and per-connection delivery
//! * **Registries** - In-memory caches of upstream-pushed world state
//!   (clients, characters, mobs, NPCs, spawn zones, chunks, skills)
//! * **Event Handlers** - One dispatch target per event type
//! * **Pending-Join Coordinator** - Defers character joins until the
//!   character record arrives from upstream, then replays them exactly once
//! * **Upstream Worker** - One reconnecting TCP link to the game-logic
//!   process
//!
//! ### Message Flow
//!
//! 1. Client sends a WebSocket text frame carrying an event envelope
//! 2. The frame is decoded into a typed [`gateway_events::Event`]
//! 3. The event is routed to its handler, which reads/updates registry
//!    state
//! 4. The handler unicasts, broadcasts, or forwards upstream per the
//!    event's delivery policy
//! 5. Upstream lines flow back through the same decode-and-dispatch path
//!
//! ### Delivery Discipline
//!
//! Outbound sends resolve the target connection by client id at the moment
//! of send and never cache socket handles. An unresolvable connection
//! silently skips the send; a failed recipient never aborts a broadcast
//! fan-out. No handler failure is fatal.
//!
//! ## Configuration
//!
//! The server is configured through the [`ServerConfig`] struct:
//!
//! * **Network settings** - Bind address, connection limits, timeouts
//! * **Upstream settings** - Address of the game-logic process
//! * **Performance tuning** - Multi-threaded accept loops via SO_REUSEPORT

// Re-export core types and functions for easy access
pub use config::ServerConfig;
pub use connection::{ClientResponseSender, ConnectionManager, WsResponseSender};
pub use error::ServerError;
pub use handlers::EventHandlers;
pub use messaging::decode_message;
pub use pending::{PendingJoinCoordinator, PendingJoinRequest};
pub use server::RelayServer;
pub use services::Services;
pub use session::{SessionContext, UpstreamHandle};

// Public module declarations
pub mod config;
pub mod error;
pub mod server;
pub mod services;

// Internal modules (not part of public API)
pub mod connection;
pub mod handlers;
pub mod messaging;
pub mod pending;
pub mod registry;
pub mod session;
pub mod upstream;

mod tests;

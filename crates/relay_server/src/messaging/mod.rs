//! Inbound message decoding.
//!
//! Turns one raw JSON text frame (from a client WebSocket or the upstream
//! TCP link) into a typed [`gateway_events::Event`]. Unknown event types
//! and unparseable frames are decode errors; the caller logs and drops
//! them.

pub mod decode;

pub use decode::{decode_message, DecodeError};

//! # Gateway Events - Typed Event Model
//!
//! Shared event and record types for the Worldgate relay tier. This crate
//! defines the typed envelope exchanged between the transport layer, the
//! domain handlers, and the upstream game-logic process.
//!
//! ## Key Types
//!
//! - [`Event`] - One typed inbound unit of work with a tagged payload
//! - [`EventData`] - Closed tagged union over scalars, opaque JSON, and domain records
//! - [`EventType`] - Closed set of event-type strings understood by the gateway
//! - [`ResponseBuilder`] - Status-qualified outbound message envelope
//! - [`EventTimestamps`] - Correlation timestamps attached at ingress and echoed on egress
//!
//! ## Design Principles
//!
//! - **Total construction**: an `Event` is never validated at construction
//!   time; interpretation is checked at the point a handler inspects the
//!   active payload variant.
//! - **Fallible variant access**: reading the wrong [`EventData`] variant
//!   returns a [`TypeMismatch`] value instead of panicking, so one malformed
//!   event can never take down the gateway.
//! - **No connection handles**: events and deferred requests carry only
//!   numeric ids; live handles are resolved fresh at send time.

pub mod envelope;
pub mod error;
pub mod event;
pub mod timestamps;
pub mod types;

pub use envelope::ResponseBuilder;
pub use error::TypeMismatch;
pub use event::{Event, EventData, EventType};
pub use timestamps::{current_timestamp_ms, EventTimestamps};
pub use types::{
    CharacterAttribute, CharacterRecord, ChunkInfoRecord, ClientInfo, MobAttribute, MobRecord,
    MovementData, NpcAttribute, NpcRecord, Position, SkillRecord, SpawnZoneRecord,
};

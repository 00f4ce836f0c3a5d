//! Error taxonomy for event interpretation and delivery.
//!
//! Nothing in this module is fatal to the process. Every failure degrades
//! to "log and continue" somewhere up the call chain so one bad event
//! cannot take down the gateway. The dispositions are:
//!
//! * wrong payload variant - logged, event silently dropped
//! * zero/empty identity fields - structured error reply to the requester
//! * target connection gone - send silently skipped
//! * write to one recipient failed - logged, fan-out continues

/// A handler inspected the wrong [`crate::EventData`] variant.
///
/// This is a programming error on the sender's side (or a malformed wire
/// message), not a recoverable condition for the event in question. The
/// event is logged and dropped without a response to any party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected} payload, got {actual}")]
pub struct TypeMismatch {
    /// The variant the handler expected
    pub expected: &'static str,
    /// The variant actually carried by the event
    pub actual: &'static str,
}

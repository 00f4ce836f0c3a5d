//! Pending-request coordinator for deferred character joins.
//!
//! A client may ask to join a character before the upstream process has
//! pushed that character's record. Instead of failing or blocking, the
//! join is queued here keyed by the awaited character id and replayed in
//! arrival order the moment the record lands.
//!
//! Queues are unbounded and have no timeout; a request can wait as long as
//! the upstream data takes to arrive. Enqueuing is not idempotent:
//! deferring the same logical request twice queues it twice and produces
//! two replies.

use crate::connection::ConnectionId;
use dashmap::DashMap;
use gateway_events::EventTimestamps;

/// One queued join, everything needed to replay it as if it had just
/// arrived. Carries only numeric ids, never a connection handle.
#[derive(Debug, Clone)]
pub struct PendingJoinRequest {
    pub client_id: i64,
    /// The character id being waited on (also the queue key)
    pub character_id: i64,
    /// Timestamps of the original request, echoed on the eventual reply
    pub timestamps: EventTimestamps,
    pub origin_connection_id: Option<ConnectionId>,
}

/// Map of awaited character id to queued joins, in arrival order.
///
/// `take_waiters` removes the queue atomically with respect to the key, so
/// a request deferred while a drain is in progress starts a fresh queue
/// and is picked up by the next data arrival rather than the drain that
/// already started.
#[derive(Debug, Default)]
pub struct PendingJoinCoordinator {
    queues: DashMap<i64, Vec<PendingJoinRequest>>,
}

impl PendingJoinCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request to the queue for its awaited character id.
    pub fn defer(&self, request: PendingJoinRequest) {
        self.queues
            .entry(request.character_id)
            .or_default()
            .push(request);
    }

    /// Atomically removes and returns every request waiting on the id, in
    /// arrival order. Empty if nothing is waiting.
    pub fn take_waiters(&self, character_id: i64) -> Vec<PendingJoinRequest> {
        self.queues
            .remove(&character_id)
            .map(|(_, waiters)| waiters)
            .unwrap_or_default()
    }

    pub fn is_waiting(&self, character_id: i64) -> bool {
        self.queues.contains_key(&character_id)
    }

    /// Number of requests currently queued under the id.
    pub fn queued_for(&self, character_id: i64) -> usize {
        self.queues
            .get(&character_id)
            .map(|waiters| waiters.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(client_id: i64, character_id: i64) -> PendingJoinRequest {
        PendingJoinRequest {
            client_id,
            character_id,
            timestamps: EventTimestamps::default(),
            origin_connection_id: None,
        }
    }

    #[test]
    fn defer_preserves_arrival_order() {
        let coordinator = PendingJoinCoordinator::new();
        coordinator.defer(request(5, 42));
        coordinator.defer(request(6, 42));

        let waiters = coordinator.take_waiters(42);
        let clients: Vec<i64> = waiters.iter().map(|w| w.client_id).collect();
        assert_eq!(clients, vec![5, 6]);
    }

    #[test]
    fn take_removes_the_key() {
        let coordinator = PendingJoinCoordinator::new();
        coordinator.defer(request(5, 42));

        assert_eq!(coordinator.take_waiters(42).len(), 1);
        assert!(!coordinator.is_waiting(42));
        assert!(coordinator.take_waiters(42).is_empty());
    }

    #[test]
    fn keys_do_not_interfere() {
        let coordinator = PendingJoinCoordinator::new();
        coordinator.defer(request(5, 42));
        coordinator.defer(request(7, 43));

        assert_eq!(coordinator.take_waiters(42).len(), 1);
        assert_eq!(coordinator.queued_for(43), 1);
    }

    #[test]
    fn defer_during_drain_starts_a_fresh_queue() {
        let coordinator = PendingJoinCoordinator::new();
        coordinator.defer(request(5, 42));

        let drained = coordinator.take_waiters(42);
        // A request arriving mid-drain lands in a new queue for the key.
        coordinator.defer(request(6, 42));

        assert_eq!(drained.len(), 1);
        assert_eq!(coordinator.queued_for(42), 1);
        assert_eq!(coordinator.take_waiters(42)[0].client_id, 6);
    }

    #[test]
    fn duplicate_defers_queue_twice() {
        let coordinator = PendingJoinCoordinator::new();
        coordinator.defer(request(5, 42));
        coordinator.defer(request(5, 42));

        assert_eq!(coordinator.queued_for(42), 2);
    }
}

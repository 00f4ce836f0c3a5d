//! Registry of authenticated client sessions.

use crate::connection::ConnectionId;
use dashmap::DashMap;
use gateway_events::ClientInfo;

/// One authenticated client session.
///
/// Carries only the numeric connection id of the connection the client
/// joined on; the live handle is resolved by the transport at send time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSession {
    pub client_id: i64,
    pub hash: String,
    /// `0` until the client joins a character
    pub character_id: i64,
    /// The connection the client joined on, if it arrived over a socket
    pub connection_id: Option<ConnectionId>,
}

/// Concurrent map of client id to session, populated on `joinGameClient`.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    sessions: DashMap<i64, ClientSession>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads (or replaces) the session for a joining client.
    pub fn load(&self, info: &ClientInfo, connection_id: Option<ConnectionId>) {
        self.sessions.insert(
            info.client_id,
            ClientSession {
                client_id: info.client_id,
                hash: info.hash.clone(),
                character_id: info.character_id,
                connection_id,
            },
        );
    }

    /// Records which character the client has joined.
    pub fn set_character_id(&self, client_id: i64, character_id: i64) {
        if let Some(mut session) = self.sessions.get_mut(&client_id) {
            session.character_id = character_id;
        }
    }

    pub fn get(&self, client_id: i64) -> Option<ClientSession> {
        self.sessions.get(&client_id).map(|s| s.clone())
    }

    /// Fresh connection lookup for a send. `None` for unknown clients and
    /// for sessions without a connection.
    pub fn connection_of(&self, client_id: i64) -> Option<ConnectionId> {
        self.sessions
            .get(&client_id)
            .and_then(|s| s.connection_id)
    }

    /// Reverse lookup used when a socket closes without a disconnect event.
    pub fn find_by_connection(&self, connection_id: ConnectionId) -> Option<ClientSession> {
        self.sessions
            .iter()
            .find(|entry| entry.connection_id == Some(connection_id))
            .map(|entry| entry.clone())
    }

    pub fn remove(&self, client_id: i64) {
        self.sessions.remove(&client_id);
    }

    /// Point-in-time snapshot of all sessions, for broadcast fan-out and
    /// the connected-clients listing.
    pub fn list(&self) -> Vec<ClientSession> {
        self.sessions.iter().map(|entry| entry.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

//! Status-qualified outbound message envelope.
//!
//! Every message the gateway emits, to a client or to the upstream process,
//! has the same shape:
//!
//! ```json
//! {
//!   "status": "success" | "error",
//!   "header": {
//!     "message": "...",
//!     "eventType": "...",
//!     "clientId": 5,
//!     "hash": "",
//!     "timestamps": { "serverRecvMs": 1, "serverSendMs": 2, ... }
//!   },
//!   "body": { ... }
//! }
//! ```

use crate::event::EventType;
use crate::timestamps::EventTimestamps;
use serde_json::{json, Map, Value};

/// Builder for the status-qualified envelope.
///
/// # Examples
///
/// ```rust
/// use gateway_events::{EventType, ResponseBuilder};
///
/// let message = ResponseBuilder::success()
///     .message("Pong!")
///     .event_type(EventType::PingClient)
///     .client_id(5)
///     .build();
/// assert_eq!(message["status"], "success");
/// assert_eq!(message["header"]["eventType"], "pingClient");
/// ```
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status: &'static str,
    header: Map<String, Value>,
    body: Map<String, Value>,
}

impl ResponseBuilder {
    pub fn success() -> Self {
        Self::with_status("success")
    }

    pub fn error() -> Self {
        Self::with_status("error")
    }

    fn with_status(status: &'static str) -> Self {
        let mut header = Map::new();
        // Token field is always present, "" when absent.
        header.insert("hash".to_string(), json!(""));
        Self {
            status,
            header,
            body: Map::new(),
        }
    }

    /// Human-readable outcome description placed in `header.message`.
    pub fn message(mut self, message: &str) -> Self {
        self.header.insert("message".to_string(), json!(message));
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.header
            .insert("eventType".to_string(), json!(event_type.as_wire()));
        self
    }

    /// Inserts an arbitrary header key. Used for egress-only headers such
    /// as `chunkId` and event-type strings outside the inbound set
    /// (`joinGame`, `spawnNPCs`).
    pub fn header(mut self, key: &str, value: Value) -> Self {
        self.header.insert(key.to_string(), value);
        self
    }

    pub fn client_id(mut self, client_id: i64) -> Self {
        self.header.insert("clientId".to_string(), json!(client_id));
        self
    }

    /// Auth token echo; omit for the default of `""`.
    pub fn hash(mut self, hash: &str) -> Self {
        self.header.insert("hash".to_string(), json!(hash));
        self
    }

    /// Echoes the triggering event's timestamps, stamping the send time now.
    pub fn timestamps(mut self, timestamps: &EventTimestamps) -> Self {
        self.header
            .insert("timestamps".to_string(), timestamps.to_envelope_json());
        self
    }

    /// Inserts one event-specific key into the body.
    pub fn body(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Value {
        json!({
            "status": self.status,
            "header": Value::Object(self.header),
            "body": Value::Object(self.body),
        })
    }

    /// Builds and serializes in one step, for handing straight to a send
    /// primitive.
    pub fn build_string(self) -> String {
        self.build().to_string()
    }
}

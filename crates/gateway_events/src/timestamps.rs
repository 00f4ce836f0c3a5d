//! Correlation timestamps carried through the gateway.
//!
//! Timestamps are opaque pass-through values: attached at ingress and echoed
//! back on every outbound message correlated to the triggering event, so a
//! caller can measure end-to-end latency without this tier understanding the
//! clock format beyond "milliseconds since the Unix epoch".

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time in milliseconds since the Unix epoch.
pub fn current_timestamp_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Correlation timestamps for one event.
///
/// `client_send_ms` and `request_id` are supplied by the client (or upstream)
/// and echoed back verbatim; `server_recv_ms` is stamped at ingress and
/// `server_send_ms` at the moment an outbound envelope is built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventTimestamps {
    pub client_send_ms: Option<i64>,
    pub server_recv_ms: Option<i64>,
    pub server_send_ms: Option<i64>,
    pub request_id: Option<String>,
}

impl EventTimestamps {
    /// Stamps a fresh ingress timestamp, keeping whatever the sender supplied.
    ///
    /// # Arguments
    ///
    /// * `client_send_ms` - The client-side send time, if the sender provided one
    /// * `request_id` - Opaque correlation id, if the sender provided one
    pub fn at_ingress(client_send_ms: Option<i64>, request_id: Option<String>) -> Self {
        Self {
            client_send_ms,
            server_recv_ms: Some(current_timestamp_ms()),
            server_send_ms: None,
            request_id,
        }
    }

    /// Builds the `header.timestamps` object for an outbound envelope,
    /// stamping the send time now. Absent fields are omitted entirely.
    pub fn to_envelope_json(&self) -> Value {
        let mut out = serde_json::Map::new();
        if let Some(recv) = self.server_recv_ms {
            out.insert("serverRecvMs".to_string(), json!(recv));
        }
        out.insert("serverSendMs".to_string(), json!(current_timestamp_ms()));
        if let Some(sent) = self.client_send_ms {
            out.insert("clientSendMsEcho".to_string(), json!(sent));
        }
        if let Some(ref id) = self.request_id {
            out.insert("requestId".to_string(), json!(id));
        }
        Value::Object(out)
    }
}

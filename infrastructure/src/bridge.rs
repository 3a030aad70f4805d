//! Background message bridge.
//!
//! A request/response channel between the host process and this client:
//! a request payload carrying the recognized marker field receives a
//! canned acknowledgment, anything else receives nothing. This is an
//! opaque pass-through with no bearing on the transcript core; the
//! transport's reader loop consults it for host-initiated requests.

use tracing::debug;

/// Marker value a request must carry in its `message` field to be
/// acknowledged.
pub const BRIDGE_MARKER: &str = "hello from aura";

/// Canned acknowledgment body.
const BRIDGE_ACK: &str = "Hello from the background bridge!";

/// Responder for host-initiated requests.
#[derive(Debug, Default)]
pub struct BackgroundBridge;

impl BackgroundBridge {
    pub fn new() -> Self {
        Self
    }

    /// Answer a host-initiated request.
    ///
    /// Returns the canned acknowledgment when the payload's `message`
    /// field equals [`BRIDGE_MARKER`], `None` otherwise.
    pub fn respond(&self, request: &serde_json::Value) -> Option<serde_json::Value> {
        let message = request.get("message")?.as_str()?;
        if message != BRIDGE_MARKER {
            return None;
        }

        debug!("Bridge request acknowledged");
        Some(serde_json::json!({ "response": BRIDGE_ACK }))
    }
}

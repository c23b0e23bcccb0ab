//! JSON encoding of protocol frames.

use super::types::{InboundIntent, OutboundEvent};

/// Serialize an outbound event to a text frame.
pub fn serialize_event(event: &OutboundEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Parse a text frame into an intent.
pub fn deserialize_intent(text: &str) -> Result<InboundIntent, serde_json::Error> {
    serde_json::from_str(text)
}

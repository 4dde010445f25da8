//! Event message types.
//!
//! Events are notifications the browser pushes for domains that have been
//! enabled. Events for a page carry the `sessionId` of the attached session.
//!
//! # Event Types
//!
//! | Domain | Events |
//! |--------|--------|
//! | `Network` | `webSocketFrameReceived` |
//!
//! Anything else parses as [`ParsedEvent::Unknown`].

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::identifiers::SessionId;

// ============================================================================
// Event
// ============================================================================

/// An event notification from the browser.
///
/// # Format
///
/// ```json
/// {
///   "method": "Domain.eventName",
///   "params": { ... },
///   "sessionId": "..."
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,

    /// Originating session (absent for browser-level events).
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<SessionId>,
}

impl Event {
    /// Returns the domain name from the method.
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        match self.method.as_str() {
            "Network.webSocketFrameReceived" => ParsedEvent::WebSocketFrameReceived {
                request_id: self.get_string("requestId"),
                opcode: self
                    .params
                    .pointer("/response/opcode")
                    .and_then(|v| v.as_u64())
                    .unwrap_or_default(),
                payload: self
                    .params
                    .pointer("/response/payloadData")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            },

            _ => ParsedEvent::Unknown {
                method: self.method.clone(),
                params: self.params.clone(),
            },
        }
    }

    /// Gets a string from params.
    #[inline]
    fn get_string(&self, key: &str) -> String {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone)]
pub enum ParsedEvent {
    /// A WebSocket message arrived on a page connection.
    WebSocketFrameReceived {
        /// Network request ID of the WebSocket.
        request_id: String,
        /// WebSocket opcode (1 = text, 2 = binary).
        opcode: u64,
        /// Frame payload (base64 for binary frames).
        payload: String,
    },

    /// Unknown event type.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_frame_parsing() {
        let json_str = r#"{
            "method": "Network.webSocketFrameReceived",
            "sessionId": "S1",
            "params": {
                "requestId": "1000.2",
                "timestamp": 12.5,
                "response": {"opcode": 1, "mask": false, "payloadData": "{\"t\":\"d\"}"}
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        assert_eq!(event.domain(), "Network");
        assert_eq!(event.event_name(), "webSocketFrameReceived");
        assert_eq!(event.session_id, Some(SessionId::new("S1")));

        match event.parse() {
            ParsedEvent::WebSocketFrameReceived {
                request_id,
                opcode,
                payload,
            } => {
                assert_eq!(request_id, "1000.2");
                assert_eq!(opcode, 1);
                assert_eq!(payload, r#"{"t":"d"}"#);
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_browser_level_event_has_no_session() {
        let json_str = r#"{"method": "Target.detachedFromTarget", "params": {"sessionId": "S9"}}"#;
        let event: Event = serde_json::from_str(json_str).expect("parse event");
        assert!(event.session_id.is_none());

        match event.parse() {
            ParsedEvent::Unknown { method, .. } => assert_eq!(method, "Target.detachedFromTarget"),
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event() {
        let json_str = r#"{"method": "Page.frameNavigated", "params": {"frame": {}}}"#;
        let event: Event = serde_json::from_str(json_str).expect("parse event");

        match event.parse() {
            ParsedEvent::Unknown { method, .. } => assert_eq!(method, "Page.frameNavigated"),
            other => panic!("expected Unknown variant, got {other:?}"),
        }
    }
}

//! Request and Response message types.
//!
//! Defines the DevTools message format for command requests and responses.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, SessionId};

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command request sent to the browser.
///
/// # Format
///
/// ```json
/// {
///   "id": 12,
///   "method": "Domain.methodName",
///   "params": { ... },
///   "sessionId": "..."
/// }
/// ```
///
/// `sessionId` is omitted for browser-level commands.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Unique identifier for request/response correlation.
    pub id: RequestId,

    /// Target session (absent for browser-level commands).
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    /// Command with method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a browser-level request with auto-generated ID.
    #[inline]
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            id: RequestId::next(),
            session_id: None,
            command,
        }
    }

    /// Creates a request routed to a page session.
    #[inline]
    #[must_use]
    pub fn for_session(session_id: SessionId, command: Command) -> Self {
        Self {
            id: RequestId::next(),
            session_id: Some(session_id),
            command,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response from the browser.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 12, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 12, "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the command `id`.
    pub id: RequestId,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error details (if error).
    #[serde(default)]
    pub error: Option<ProtocolError>,

    /// Session the response belongs to.
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<SessionId>,
}

/// Error object of a failed command.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolError {
    /// JSON-RPC style error code.
    pub code: i64,
    /// Human readable message.
    pub message: String,
}

impl Response {
    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, returning error if response was error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the response was an error.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            None => Ok(self.result.unwrap_or(Value::Null)),
            Some(err) => Err(Error::protocol(format!("{} ({})", err.message, err.code))),
        }
    }

    /// Gets a string value from the result.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{NetworkCommand, PageCommand};

    #[test]
    fn test_request_serialization() {
        let command = Command::Page(PageCommand::Navigate {
            url: "https://example.com".to_string(),
        });

        let request = Request::for_session(SessionId::new("S1"), command);
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json["method"], "Page.navigate");
        assert_eq!(json["sessionId"], "S1");
        assert!(json["id"].is_u64());
    }

    #[test]
    fn test_browser_level_request_omits_session() {
        let request = Request::new(Command::Network(NetworkCommand::Enable));
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("sessionId"));
    }

    #[test]
    fn test_success_response() {
        let json_str = r#"{"id": 4, "result": {"targetId": "ABC"}}"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert!(!response.is_error());
        assert_eq!(response.get_string("targetId"), "ABC");
        assert_eq!(response.get_string("missing"), "");
    }

    #[test]
    fn test_into_result_error() {
        let json_str = r#"{
            "id": 5,
            "error": {"code": -32000, "message": "No target with given id found"}
        }"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert!(response.is_error());

        let err = response.into_result().unwrap_err();
        assert!(err.to_string().contains("No target with given id found"));
    }

    #[test]
    fn test_event_is_not_a_response() {
        let json_str = r#"{"method": "Network.webSocketFrameReceived", "params": {}}"#;
        assert!(serde_json::from_str::<Response>(json_str).is_err());
    }
}

//! Board domain model.
//!
//! Serialized with the field names the HTTP API exposes:
//!
//! ```json
//! {
//!   "boardName": "Sprint Retro",
//!   "columns": [{ "id": 0, "value": "Went Well", "messageIds": ["m1"] }],
//!   "messages": [{ "messageId": "m1", "text": "Great demo", "votes": 3 }]
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Message
// ============================================================================

/// A single retrospective entry with its aggregated votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier, unique within a board.
    #[serde(rename = "messageId")]
    pub id: String,

    /// Display text.
    pub text: String,

    /// Sum of every voter's weight.
    pub votes: u64,
}

impl Message {
    /// Creates a message.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>, votes: u64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            votes,
        }
    }
}

// ============================================================================
// BoardColumn
// ============================================================================

/// A titled column referencing its messages by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    /// Ordering key, unique within a board.
    pub id: u32,

    /// Column title.
    #[serde(rename = "value")]
    pub title: String,

    /// Ids of the messages in this column.
    pub message_ids: Vec<String>,
}

impl BoardColumn {
    /// Creates a column.
    #[inline]
    #[must_use]
    pub fn new(id: u32, title: impl Into<String>, message_ids: Vec<String>) -> Self {
        Self {
            id,
            title: title.into(),
            message_ids,
        }
    }
}

// ============================================================================
// BoardInformation
// ============================================================================

/// A fully assembled board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardInformation {
    /// Board display name, absent when the board-info frame was missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_name: Option<String>,

    /// Columns in assembly order.
    #[serde(default)]
    pub columns: Vec<BoardColumn>,

    /// Messages in assembly order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl BoardInformation {
    /// Creates an empty board with a name.
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            board_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Returns the board name, or an empty string when absent.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.board_name.as_deref().unwrap_or_default()
    }

    /// Returns `true` if assembly could not recover a name or any column.
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.board_name.as_deref().is_none_or(str::is_empty) || self.columns.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Raw frame schema.
//!
//! Board data arrives as realtime-database push frames:
//!
//! ```json
//! {"t":"d","d":{"b":{"p":"publicboards/<id>","d":{ ... }}}}
//! ```
//!
//! The descriptor at `p` tells which [`Family`] the value at `d` belongs to.
//!
//! | Family | Descriptor prefix | Value |
//! |--------|-------------------|-------|
//! | [`Family::BoardInfo`] | `publicboards` | `{boardName, columns: {id: {value}}}` |
//! | [`Family::Columns`] | `columns/publicboards` | `{id: {messagesIds}}` |
//! | [`Family::Messages`] | `messages` | `{id: {text, votes}}` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// Family
// ============================================================================

/// The three payload families a board is rebuilt from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Board name and column titles.
    BoardInfo,
    /// Column id to message ids.
    Columns,
    /// Message id to text and votes.
    Messages,
}

impl Family {
    /// Every family, in slot order.
    pub const ALL: [Family; 3] = [Family::BoardInfo, Family::Columns, Family::Messages];

    /// Returns the slot index of this family.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::BoardInfo => 0,
            Self::Columns => 1,
            Self::Messages => 2,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BoardInfo => "board-info",
            Self::Columns => "columns",
            Self::Messages => "messages",
        };
        f.write_str(name)
    }
}

// ============================================================================
// FrameSchema
// ============================================================================

/// Where to find descriptors and values, and how to recognize families.
#[derive(Debug, Clone)]
pub struct FrameSchema {
    /// JSON pointer to the descriptor string.
    pub descriptor_pointer: String,
    /// JSON pointer to the payload value.
    pub value_pointer: String,
    /// Descriptor prefix of the board-info family.
    pub board_prefix: String,
    /// Descriptor prefix of the column map family.
    pub columns_prefix: String,
    /// Descriptor prefix of the messages family.
    pub messages_prefix: String,
    /// Raw-text predicate a frame must match to be kept.
    content_pattern: Regex,
}

impl Default for FrameSchema {
    fn default() -> Self {
        Self {
            descriptor_pointer: "/d/b/p".to_string(),
            value_pointer: "/d/b/d".to_string(),
            board_prefix: "publicboards".to_string(),
            columns_prefix: "columns/publicboards".to_string(),
            messages_prefix: "messages".to_string(),
            content_pattern: default_content_pattern(),
        }
    }
}

/// Matches frames mentioning either data family.
fn default_content_pattern() -> Regex {
    Regex::new("messages|publicboards").expect("Invalid content regex")
}

impl FrameSchema {
    /// Replaces the raw-text predicate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `pattern` is not a valid regex.
    pub fn with_content_pattern(mut self, pattern: &str) -> Result<Self> {
        self.content_pattern = Regex::new(pattern)
            .map_err(|e| Error::config(format!("Invalid content pattern: {e}")))?;
        Ok(self)
    }

    /// Returns `true` if the raw frame text looks like board data.
    #[inline]
    #[must_use]
    pub fn is_candidate(&self, raw: &str) -> bool {
        self.content_pattern.is_match(raw)
    }

    /// Extracts the descriptor string of a parsed frame.
    #[inline]
    #[must_use]
    pub fn descriptor<'a>(&self, payload: &'a Value) -> Option<&'a str> {
        payload.pointer(&self.descriptor_pointer)?.as_str()
    }

    /// Routes a parsed frame to its family and value.
    ///
    /// Returns `None` for frames of no known family or without a value.
    #[must_use]
    pub fn classify<'a>(&self, payload: &'a Value) -> Option<(Family, &'a Value)> {
        let family = self.family_of(self.descriptor(payload)?)?;
        let value = payload.pointer(&self.value_pointer)?;
        Some((family, value))
    }

    /// Maps a descriptor to its family by prefix.
    #[must_use]
    pub fn family_of(&self, descriptor: &str) -> Option<Family> {
        // The column map prefix contains the board prefix, so it goes first
        if descriptor.starts_with(&self.columns_prefix) {
            Some(Family::Columns)
        } else if descriptor.starts_with(&self.board_prefix) {
            Some(Family::BoardInfo)
        } else if descriptor.starts_with(&self.messages_prefix) {
            Some(Family::Messages)
        } else {
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

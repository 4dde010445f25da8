//! Board export.
//!
//! Renders the stored board into text records and streams them to a sink.
//!
//! | Format | Token | Extension | Content type |
//! |--------|-------|-----------|--------------|
//! | [`ExportFormat::Csv`] | `csv` | `csv` | `text/csv` |
//! | [`ExportFormat::Legacy`] | `legacy` | `txt` | `text/plain` |
//!
//! Both renderers start from the same join: columns sorted by id, each with
//! the stored messages it references, in stored order.

// ============================================================================
// Submodules
// ============================================================================

/// Column-major CSV pivot.
pub mod csv;

/// Human-readable outline.
pub mod legacy;

/// Back-pressure aware record writer.
pub mod writer;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::mem::take;
use std::str::FromStr;

use rustc_hash::FxHashSet;

use crate::board::{BoardColumn, BoardInformation, Message};
use crate::error::{Error, Result};

pub use writer::{ChannelSink, RecordSink, WriterSink, record_channel, write_records};

/// File base name used when the board has no usable name.
pub const FALLBACK_BASE_NAME: &str = "retro_board";

// ============================================================================
// ExportFormat
// ============================================================================

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ExportFormat {
    /// One column per board column, one row per message rank.
    Csv,
    /// Board name, then each column as a titled bullet list.
    Legacy,
}

impl ExportFormat {
    /// Returns the format token.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Legacy => "legacy",
        }
    }

    /// Returns the file extension.
    #[inline]
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Legacy => "txt",
        }
    }

    /// Returns the MIME type.
    #[inline]
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Legacy => "text/plain",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(Self::Csv),
            "legacy" => Ok(Self::Legacy),
            other => Err(Error::invalid_format(other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// BoardExport
// ============================================================================

/// Rendered records plus the metadata needed to deliver them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardExport {
    /// Format the records are in.
    pub format: ExportFormat,
    /// Suggested file name without extension.
    pub base_name: String,
    /// Output lines, each newline-terminated.
    pub lines: Vec<String>,
}

impl BoardExport {
    /// Renders `board` in `format`.
    #[must_use]
    pub fn render(board: &BoardInformation, format: ExportFormat) -> Self {
        let lines = match format {
            ExportFormat::Csv => csv::render_csv(board),
            ExportFormat::Legacy => legacy::render_legacy(board),
        };

        Self {
            format,
            base_name: file_base_name(board),
            lines,
        }
    }

    /// Returns `<base_name>.<extension>`.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.base_name, self.format.extension())
    }

    /// Returns the concatenated output.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines.concat()
    }
}

// ============================================================================
// Join
// ============================================================================

/// A column with the messages it references.
#[derive(Debug, Clone)]
pub struct ColumnMessages<'a> {
    /// The column.
    pub column: &'a BoardColumn,
    /// Its messages, in stored order.
    pub messages: Vec<&'a Message>,
}

/// Sorts columns by id and attaches their messages.
///
/// Messages keep the board's stored order, not the column's id order.
#[must_use]
pub fn join_columns(board: &BoardInformation) -> Vec<ColumnMessages<'_>> {
    let mut columns: Vec<&BoardColumn> = board.columns.iter().collect();
    columns.sort_by_key(|column| column.id);

    columns
        .into_iter()
        .map(|column| {
            let ids: FxHashSet<&str> = column.message_ids.iter().map(String::as_str).collect();
            ColumnMessages {
                column,
                messages: board
                    .messages
                    .iter()
                    .filter(|message| ids.contains(message.id.as_str()))
                    .collect(),
            }
        })
        .collect()
}

// ============================================================================
// File Names
// ============================================================================

/// Suggested file base name for `board`.
#[must_use]
pub fn file_base_name(board: &BoardInformation) -> String {
    let name = snake_case(board.name());
    if name.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        name
    }
}

/// Lowercases `input` and joins its words with underscores.
///
/// Words break on non-alphanumerics and on lower-to-upper transitions.
/// Apostrophes are dropped so contractions stay one word.
#[must_use]
pub fn snake_case(input: &str) -> String {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in input.chars() {
        if matches!(ch, '\'' | '\u{2019}') {
            continue;
        }

        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(take(&mut current));
            }
            prev_lower = false;
            continue;
        }

        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_numeric();
        current.extend(ch.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }

    words.join("_")
}

// ============================================================================
// Tests
// ============================================================================

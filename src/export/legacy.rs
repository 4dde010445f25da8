//! Human-readable outline.
//!
//! ```text
//! Sprint Retro
//!
//! Went Well
//! - Great demo (3)
//!
//! Improve
//!
//! ```

use crate::board::BoardInformation;

use super::join_columns;

/// Renders the board name, then each column as a titled bullet list.
///
/// Every column block ends with one blank line, even when empty.
#[must_use]
pub fn render_legacy(board: &BoardInformation) -> Vec<String> {
    let joined = join_columns(board);
    let mut lines = Vec::with_capacity(1 + joined.len() * 2 + board.messages.len());

    lines.push(format!("{}\n\n", board.name()));

    for cm in joined {
        lines.push(format!("{}\n", cm.column.title));
        lines.extend(
            cm.messages
                .iter()
                .map(|m| format!("- {} ({})\n", m.text, m.votes)),
        );
        lines.push("\n".to_string());
    }

    lines
}

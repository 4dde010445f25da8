//! Column-major CSV pivot.
//!
//! Each board column becomes a CSV column. Row `i` holds, per column, the
//! `i`-th message taken from the end of that column's joined list; exhausted
//! columns and messages without votes yield an empty field.
//!
//! ```text
//! Went Well,Improve
//! Great demo,
//! ```

use crate::board::{BoardInformation, Message};

use super::join_columns;

/// Renders the header line and one line per message rank.
#[must_use]
pub fn render_csv(board: &BoardInformation) -> Vec<String> {
    let joined = join_columns(board);

    let header: Vec<&str> = joined.iter().map(|cm| cm.column.title.as_str()).collect();

    // Working copies; the stored board is never touched
    let mut stacks: Vec<Vec<&Message>> = joined.into_iter().map(|cm| cm.messages).collect();
    let row_count = stacks.iter().map(Vec::len).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(row_count + 1);
    lines.push(render_row(header));

    for _ in 0..row_count {
        let row = stacks.iter_mut().map(|stack| match stack.pop() {
            Some(message) if message.votes >= 1 => message.text.as_str(),
            _ => "",
        });
        lines.push(render_row(row));
    }

    lines
}

/// Joins escaped fields with commas and terminates the line.
fn render_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn needs_quotes(field: &str) -> bool {
    field.contains([',', '"', '\n', '\r'])
}

/// Quotes a field when it holds a separator, quote, or line break.
#[must_use]
pub fn escape_field(field: &str) -> String {
    if needs_quotes(field) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::board::BoardColumn;
    use crate::export::tests::sprint_retro;

    #[test]
    fn test_sprint_retro_example() {
        assert_eq!(
            render_csv(&sprint_retro()),
            vec!["Went Well,Improve\n", "Great demo,\n"]
        );
    }

    #[test]
    fn test_unequal_columns_stay_aligned() {
        let board = BoardInformation {
            board_name: Some("B".into()),
            columns: vec![
                BoardColumn::new(5, "C", vec!["c1".into()]),
                BoardColumn::new(0, "A", vec!["a1".into(), "a2".into(), "a3".into()]),
                BoardColumn::new(2, "B", Vec::new()),
            ],
            messages: vec![
                Message::new("a1", "first", 1),
                Message::new("a2", "zero", 0),
                Message::new("a3", "third", 2),
                Message::new("c1", "only", 4),
            ],
        };

        let lines = render_csv(&board);
        assert_eq!(
            lines,
            vec!["A,B,C\n", "third,,only\n", ",,\n", "first,,\n"]
        );
        for line in &lines {
            assert_eq!(line.matches(',').count(), 2);
        }
    }

    #[test]
    fn test_rendering_leaves_board_untouched() {
        let board = sprint_retro();
        let before = board.clone();
        let _ = render_csv(&board);
        let _ = render_csv(&board);
        assert_eq!(board, before);
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_empty_board() {
        assert_eq!(render_csv(&BoardInformation::default()), vec!["\n"]);
    }
}

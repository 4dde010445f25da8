//! Board assembly from captured frames.
//!
//! Frames are routed into one slot per [`Family`]; when a family appears
//! more than once, the frame that arrived last wins. Missing slots degrade
//! to an absent name or empty lists instead of failing.

// ============================================================================
// Imports
// ============================================================================

use std::cmp::Ordering;

use serde_json::Value;
use tracing::{debug, warn};

use super::frame::{Family, FrameSchema};
use super::model::{BoardColumn, BoardInformation, Message};

// ============================================================================
// assemble
// ============================================================================

/// Rebuilds a board from raw frames, given in arrival order.
#[must_use]
pub fn assemble(payloads: &[Value], schema: &FrameSchema) -> BoardInformation {
    let mut slots: [Option<&Value>; 3] = [None, None, None];

    for payload in payloads {
        match schema.classify(payload) {
            Some((family, value)) => slots[family.index()] = Some(value),
            None => debug!(
                descriptor = schema.descriptor(payload).unwrap_or_default(),
                "Frame matches no family"
            ),
        }
    }

    let [info, column_map, messages] = slots;

    for family in Family::ALL {
        if slots[family.index()].is_none() {
            warn!(%family, "Board assembled without family");
        }
    }

    let board_name = info
        .and_then(|v| v.get("boardName"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let columns = info
        .and_then(|v| v.get("columns"))
        .map(|titles| build_columns(titles, column_map))
        .unwrap_or_default();

    let messages = messages.map(build_messages).unwrap_or_default();

    debug!(
        columns = columns.len(),
        messages = messages.len(),
        "Board assembled"
    );

    BoardInformation {
        board_name,
        columns,
        messages,
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// One column per titled entry, with ids looked up in the column map.
fn build_columns(titles: &Value, column_map: Option<&Value>) -> Vec<BoardColumn> {
    ordered_entries(titles)
        .into_iter()
        .filter_map(|(key, value)| {
            let id = key.parse::<u32>().ok()?;
            let title = value.get("value").and_then(Value::as_str).unwrap_or_default();
            let message_ids = column_map
                .and_then(|map| lookup(map, id))
                .and_then(|entry| entry.get("messagesIds"))
                .map(message_ids)
                .unwrap_or_default();
            Some(BoardColumn::new(id, title, message_ids))
        })
        .collect()
}

/// One message per entry, votes summed over every voter.
fn build_messages(value: &Value) -> Vec<Message> {
    ordered_entries(value)
        .into_iter()
        .map(|(key, entry)| {
            let text = entry.get("text").and_then(Value::as_str).unwrap_or_default();
            let votes = entry.get("votes").map(sum_votes).unwrap_or_default();
            Message::new(key, text, votes)
        })
        .collect()
}

/// Finds the entry whose integer key equals `id`.
fn lookup(map: &Value, id: u32) -> Option<&Value> {
    ordered_entries(map)
        .into_iter()
        .find(|(key, _)| key.parse::<u32>().ok() == Some(id))
        .map(|(_, value)| value)
}

/// Message ids from an index-keyed object or an array.
fn message_ids(value: &Value) -> Vec<String> {
    ordered_entries(value)
        .into_iter()
        .filter_map(|(_, id)| id.as_str().map(str::to_string))
        .collect()
}

/// Total of every vote weight, saturating, never below zero.
fn sum_votes(votes: &Value) -> u64 {
    let total = ordered_entries(votes)
        .into_iter()
        .filter_map(|(_, weight)| {
            weight
                .as_i64()
                .or_else(|| weight.as_f64().map(|f| f as i64))
        })
        .fold(0i64, i64::saturating_add);
    u64::try_from(total).unwrap_or(0)
}

/// Entries of an object or array, integer keys ascending first.
///
/// Arrays stand in for integer-keyed objects; their `null` holes are skipped.
fn ordered_entries(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v)).collect();
            entries.sort_by(|(a, _), (b, _)| compare_keys(a, b));
            entries
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    fn frame(descriptor: &str, value: Value) -> Value {
        json!({"t": "d", "d": {"b": {"p": descriptor, "d": value}}})
    }

    fn sample_frames() -> Vec<Value> {
        vec![
            frame(
                "publicboards/b1",
                json!({
                    "boardName": "Sprint Retro",
                    "columns": {"0": {"value": "Went Well"}, "1": {"value": "Improve"}, "x": {"value": "skip"}}
                }),
            ),
            frame(
                "columns/publicboards/b1",
                json!({"0": {"messagesIds": {"0": "m1", "1": "m2"}}}),
            ),
            frame(
                "messages/b1",
                json!({
                    "m1": {"text": "Great demo", "votes": {"u1": 1, "u2": 2}},
                    "m2": {"text": "Flaky CI", "votes": {}}
                }),
            ),
        ]
    }

    #[test]
    fn test_assembles_all_families() {
        let board = assemble(&sample_frames(), &FrameSchema::default());

        assert_eq!(board.board_name.as_deref(), Some("Sprint Retro"));
        assert_eq!(
            board.columns,
            vec![
                BoardColumn::new(0, "Went Well", vec!["m1".into(), "m2".into()]),
                BoardColumn::new(1, "Improve", Vec::new()),
            ]
        );
        assert_eq!(
            board.messages,
            vec![
                Message::new("m1", "Great demo", 3),
                Message::new("m2", "Flaky CI", 0)
            ]
        );
        assert!(!board.is_degraded());
    }

    #[test]
    fn test_missing_families_degrade() {
        let board = assemble(&sample_frames()[2..], &FrameSchema::default());
        assert_eq!(board.board_name, None);
        assert!(board.columns.is_empty());
        assert_eq!(board.messages.len(), 2);
        assert!(board.is_degraded());

        let empty = assemble(&[], &FrameSchema::default());
        assert_eq!(empty, BoardInformation::default());
    }

    #[test]
    fn test_last_frame_of_family_wins() {
        let mut frames = sample_frames();
        frames.push(frame(
            "publicboards/b1",
            json!({"boardName": "Renamed", "columns": {}}),
        ));

        let board = assemble(&frames, &FrameSchema::default());
        assert_eq!(board.board_name.as_deref(), Some("Renamed"));
        assert!(board.columns.is_empty());
    }

    #[test]
    fn test_array_shaped_maps() {
        let frames = vec![
            frame(
                "publicboards/b",
                json!({"boardName": "B", "columns": [{"value": "A"}, null, {"value": "C"}]}),
            ),
            frame(
                "columns/publicboards/b",
                json!([null, null, {"messagesIds": ["m9", null, "m8"]}]),
            ),
        ];

        let board = assemble(&frames, &FrameSchema::default());
        assert_eq!(
            board.columns,
            vec![
                BoardColumn::new(0, "A", Vec::new()),
                BoardColumn::new(2, "C", vec!["m9".into(), "m8".into()]),
            ]
        );
    }

    #[test]
    fn test_numeric_key_order() {
        let ids = message_ids(&json!({"10": "k", "2": "c", "0": "a", "1": "b"}));
        assert_eq!(ids, vec!["a", "b", "c", "k"]);
    }

    #[test]
    fn test_negative_total_clamps_to_zero() {
        assert_eq!(sum_votes(&json!({"a": 1, "b": -3})), 0);
        assert_eq!(sum_votes(&json!({"a": 1.0, "b": 2})), 3);
    }

    #[test]
    fn test_huge_weights_saturate() {
        let max = u64::try_from(i64::MAX).expect("positive");
        assert_eq!(sum_votes(&json!({"a": i64::MAX, "b": 1})), max);
        assert_eq!(sum_votes(&json!({"a": 1e19, "b": 1e19})), max);
        assert_eq!(sum_votes(&json!({"a": i64::MIN, "b": -1, "c": 5})), 0);
    }

    proptest! {
        #[test]
        fn prop_assembly_is_order_independent(
            votes in proptest::collection::vec(0u32..50, 0..6),
            order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
        ) {
            let vote_map: serde_json::Map<String, Value> = votes
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("u{i}"), json!(v)))
                .collect();

            let mut frames = sample_frames();
            frames.push(frame("users/b1", json!({"ignored": true})));
            frames[2] = frame(
                "messages/b1",
                json!({"m1": {"text": "Great demo", "votes": vote_map}}),
            );

            let shuffled: Vec<Value> = order.iter().map(|&i| frames[i].clone()).collect();

            let schema = FrameSchema::default();
            let expected = assemble(&frames, &schema);
            prop_assert_eq!(assemble(&shuffled, &schema), expected.clone());

            let total: u64 = votes.iter().map(|&v| u64::from(v)).sum();
            prop_assert_eq!(expected.messages[0].votes, total);
        }
    }
}

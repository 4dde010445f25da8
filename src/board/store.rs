//! Single-slot board store.
//!
//! Holds the most recently assembled board. A save replaces the previous
//! board wholesale; readers get a cheap [`Arc`] snapshot.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::model::BoardInformation;

/// Holder of the latest board.
#[derive(Debug, Default)]
pub struct BoardStore {
    current: RwLock<Option<Arc<BoardInformation>>>,
}

impl BoardStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored board and returns the shared handle.
    pub fn save(&self, board: BoardInformation) -> Arc<BoardInformation> {
        let board = Arc::new(board);
        debug!(
            board_name = board.name(),
            columns = board.columns.len(),
            "Board stored"
        );
        *self.current.write() = Some(Arc::clone(&board));
        board
    }

    /// Returns the stored board, if any.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<Arc<BoardInformation>> {
        self.current.read().clone()
    }

    /// Returns `true` if a board was stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.read().is_none()
    }
}

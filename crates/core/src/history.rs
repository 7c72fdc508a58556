//! Linear undo/redo history of whole-session snapshots.

use crate::error::HistoryError;

/// Ordered snapshots plus a cursor at the active one.
///
/// Snapshot `0` is the state the history was created or reset with. Every
/// snapshot is an owned clone, so nothing handed out by [`History::undo`] or
/// [`History::redo`] aliases what is stored.
#[derive(Debug, Clone)]
pub struct History<S> {
    snapshots: Vec<S>,
    cursor: usize,
}

impl<S: Clone> History<S> {
    /// Start a history whose only snapshot is `initial`.
    pub fn new(initial: &S) -> Self {
        Self {
            snapshots: vec![initial.clone()],
            cursor: 0,
        }
    }

    /// Drop any redo branch and append `state` as the active snapshot.
    pub fn record(&mut self, state: &S) {
        if self.cursor + 1 < self.snapshots.len() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(state.clone());
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot and return a copy of it.
    pub fn undo(&mut self) -> Result<S, HistoryError> {
        if self.cursor == 0 {
            return Err(HistoryError::CannotUndo);
        }
        self.cursor -= 1;
        Ok(self.snapshots[self.cursor].clone())
    }

    /// Step forward one snapshot and return a copy of it.
    pub fn redo(&mut self) -> Result<S, HistoryError> {
        if self.cursor + 1 >= self.snapshots.len() {
            return Err(HistoryError::CannotRedo);
        }
        self.cursor += 1;
        Ok(self.snapshots[self.cursor].clone())
    }

    /// Forget everything and start over from `state`.
    pub fn reset(&mut self, state: &S) {
        self.snapshots.clear();
        self.snapshots.push(state.clone());
        self.cursor = 0;
    }

    /// Whether an older snapshot exists.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a newer snapshot exists.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Index of the active snapshot.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored snapshots, including the initial one.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot is stored. A history built with [`History::new`]
    /// or [`History::reset`] always holds one.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Borrow the active snapshot.
    pub fn current(&self) -> &S {
        &self.snapshots[self.cursor]
    }
}

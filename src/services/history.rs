//! History store — per-room stroke log with a global undo/redo stack.
//!
//! DESIGN
//! ======
//! `history` is the ordered list of strokes currently on the canvas; `redo`
//! holds strokes removed by undo, most recent last. Invariants:
//! - `history.len() <= max_len`; overflow evicts the oldest stroke on append.
//! - Every successful append empties `redo` (no redo across a diverging draw).
//! - `clear` empties both and leaves nothing to undo.
//!
//! Every method either fully applies or leaves both stacks untouched.

use std::collections::VecDeque;

use crate::services::stroke::{Operation, ValidationError};

/// Default bound on strokes kept per room.
pub const MAX_HISTORY: usize = 10_000;

#[derive(Debug, Clone)]
pub struct HistoryStore {
    history: VecDeque<Operation>,
    redo: Vec<Operation>,
    max_len: usize,
}

impl HistoryStore {
    /// Empty store bounded to `max_len` strokes (clamped to at least 1).
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self { history: VecDeque::new(), redo: Vec::new(), max_len: max_len.max(1) }
    }

    /// Validate and push `op`, clearing redo and evicting the oldest stroke
    /// if the bound is exceeded.
    ///
    /// # Errors
    ///
    /// Returns the validation failure; the store is left untouched.
    pub fn append(&mut self, op: Operation) -> Result<(), ValidationError> {
        op.check()?;
        self.history.push_back(op);
        self.redo.clear();
        while self.history.len() > self.max_len {
            self.history.pop_front();
        }
        Ok(())
    }

    /// Move the newest stroke onto the redo stack. No-op when empty.
    pub fn undo(&mut self) -> Vec<Operation> {
        if let Some(op) = self.history.pop_back() {
            self.redo.push(op);
        }
        self.snapshot()
    }

    /// Restore the most recently undone stroke. No-op when nothing to redo.
    pub fn redo(&mut self) -> Vec<Operation> {
        if let Some(op) = self.redo.pop() {
            self.history.push_back(op);
        }
        self.snapshot()
    }

    /// Irreversibly drop all strokes and the redo stack.
    pub fn clear(&mut self) {
        self.history.clear();
        self.redo.clear();
    }

    /// Full current history, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Operation> {
        self.history.iter().cloned().collect()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
impl HistoryStore {
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

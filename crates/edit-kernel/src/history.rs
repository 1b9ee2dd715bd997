//! Undo and redo stacks with typing-run coalescing.
//!
//! Each entry records one reversible edit plus the cursor and selection on
//! either side. Consecutive single-character insertions and deletions merge
//! into one entry so a typed word undoes in one step. Depth is bounded;
//! recording past the bound evicts the oldest undoable entry.

use std::time::Instant;

use crate::line_index::{Position, Selection};

/// Default maximum number of undoable entries.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// How an entry may absorb the next recorded edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Never merges.
    None,
    /// A single-character insertion; merges with a contiguous insertion.
    Insert,
    /// A single-character deletion; merges with an adjacent deletion.
    Delete,
}

/// One reversible edit.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Character offset the edit starts at.
    pub offset: usize,
    /// Text the edit inserted. Empty for pure deletions.
    pub inserted_text: String,
    /// Text the edit removed. Empty for pure insertions.
    pub deleted_text: String,
    /// Cursor position before the edit.
    pub cursor_before: Position,
    /// Cursor position after the edit.
    pub cursor_after: Position,
    /// Selection before the edit, if any.
    pub selection_before: Option<Selection>,
    /// Selection after the edit, if any.
    pub selection_after: Option<Selection>,
    /// Whether and how this entry coalesces with the next edit.
    pub merge_mode: MergeMode,
    /// When the edit was recorded.
    pub timestamp: Instant,
}

impl HistoryEntry {
    fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Try to absorb `next` into this entry. Returns false when the edits
    /// are not a contiguous typing run.
    fn try_merge(&mut self, next: &HistoryEntry) -> bool {
        if self.merge_mode == MergeMode::None || self.merge_mode != next.merge_mode {
            return false;
        }
        match self.merge_mode {
            MergeMode::Insert => {
                // A typing run: each insertion lands right after the last.
                if next.offset != self.offset + self.inserted_len() {
                    return false;
                }
                self.inserted_text.push_str(&next.inserted_text);
            }
            MergeMode::Delete => {
                if next.offset + next.deleted_text.chars().count() == self.offset {
                    // Backspace run: deletions walk backwards.
                    self.offset = next.offset;
                    self.deleted_text =
                        format!("{}{}", next.deleted_text, self.deleted_text);
                } else if next.offset == self.offset {
                    // Forward-delete run: offset stays put.
                    self.deleted_text.push_str(&next.deleted_text);
                } else {
                    return false;
                }
            }
            MergeMode::None => unreachable!(),
        }
        self.cursor_after = next.cursor_after;
        self.selection_after = next.selection_after;
        self.timestamp = next.timestamp;
        true
    }
}

/// Bounded undo/redo history.
pub struct History {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl History {
    /// Create a history bounded to `max_depth` undoable entries.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record a new edit. Clears the redo stack and coalesces with the top
    /// undo entry when the merge modes line up.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.redo.clear();
        if let Some(top) = self.undo.last_mut()
            && top.try_merge(&entry)
        {
            return;
        }
        if self.undo.len() >= self.max_depth {
            self.undo.remove(0);
        }
        self.undo.push(entry);
    }

    /// Pop the most recent undoable entry.
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo.pop()
    }

    /// Push an undone entry onto the redo stack.
    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo.push(entry);
    }

    /// Pop the most recent redoable entry.
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo.pop()
    }

    /// Push a redone entry back onto the undo stack without clearing redo.
    pub fn restore_undo(&mut self, entry: HistoryEntry) {
        self.undo.push(entry);
    }

    /// Whether an undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether a redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Drop all recorded entries.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Current (undo, redo) stack depths.
    pub fn depths(&self) -> (usize, usize) {
        (self.undo.len(), self.redo.len())
    }
}

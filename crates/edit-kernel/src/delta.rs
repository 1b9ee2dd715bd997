//! Structured edit descriptors.
//!
//! An [`EditDescriptor`] describes a single text change in both character and
//! line coordinates. It is the one edit vocabulary shared by live typing,
//! undo/redo replay, the offset ledger, and the analysis worker interface, so
//! downstream bookkeeping has exactly one code path regardless of where a
//! change came from.

use crate::line_index::Position;

/// A single text edit in character offsets and logical positions.
///
/// Semantics:
/// - `start_index` is a character offset in the document **before** the edit.
/// - The replaced range is `[start_index, old_end_index)`; after the edit the
///   inserted text occupies `[start_index, new_end_index)`.
/// - Positions mirror the three offsets in (line, column) space;
///   `new_end_position` is measured in the post-edit document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDescriptor {
    /// Start character offset of the edit.
    pub start_index: usize,
    /// Exclusive end of the replaced range in the pre-edit document.
    pub old_end_index: usize,
    /// Exclusive end of the inserted text in the post-edit document.
    pub new_end_index: usize,
    /// Start position of the edit.
    pub start_position: Position,
    /// End position of the replaced range in the pre-edit document.
    pub old_end_position: Position,
    /// End position of the inserted text in the post-edit document.
    pub new_end_position: Position,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
    /// Exact deleted text (may be empty). Workers that track their own prior
    /// state can derive this; it is supplied alongside for convenience.
    pub deleted_text: String,
}

impl EditDescriptor {
    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.new_end_index - self.start_index
    }

    /// Length of `deleted_text` in characters.
    pub fn deleted_len(&self) -> usize {
        self.old_end_index - self.start_index
    }

    /// Net character delta (`inserted - deleted`).
    pub fn char_delta(&self) -> isize {
        self.new_end_index as isize - self.old_end_index as isize
    }

    /// Net line delta (`inserted newlines - deleted newlines`).
    pub fn line_delta(&self) -> isize {
        self.new_end_position.line as isize - self.old_end_position.line as isize
    }

    /// Whether this edit is a pure insertion at a single point.
    pub fn is_point_insertion(&self) -> bool {
        self.old_end_index == self.start_index
    }
}

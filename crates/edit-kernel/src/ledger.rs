//! Edit offset ledger and coordinate remapping.
//!
//! An analysis result (highlight spans, fold ranges, markers) is computed for
//! some buffer state S0, while the live buffer keeps advancing through edits
//! E1..En before the next result lands. The ledger records one [`EditOffset`]
//! per such edit and shifts stale analysis coordinates through them
//! algebraically:
//!
//! - **Backward mapping** (current → analysis-time) replays the ledger
//!   newest-to-oldest, inverse-applying each edit. A coordinate inside an
//!   edit's inserted region has no analysis-time counterpart and is reported
//!   as dirty rather than guessed.
//! - **Forward mapping** (analysis-time → current) replays the ledger
//!   oldest-to-newest using the overlap algebra in
//!   [`EditLedger::map_span_to_current`].
//!
//! Entries must be replayed in the order they were applied to the buffer;
//! reordering produces incorrect ranges.

use crate::delta::EditDescriptor;

/// One edit's effect, in both character and line coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOffset {
    /// Net character delta (`inserted - deleted`).
    pub char_delta: isize,
    /// Net line delta (`inserted newlines - deleted newlines`).
    pub line_delta: isize,
    /// Character offset where the edit starts.
    pub from_char_index: usize,
    /// Column of the edit start within its line.
    pub from_column: usize,
    /// Line row where the edit starts.
    pub from_line_row: usize,
    /// Exclusive end of the replaced range, pre-edit coordinates.
    pub old_end_index: usize,
    /// Exclusive end of the inserted text, post-edit coordinates.
    pub new_end_index: usize,
    /// Row of `old_end_index`, pre-edit coordinates.
    pub old_end_row: usize,
    /// Row of `new_end_index`, post-edit coordinates.
    pub new_end_row: usize,
}

impl EditOffset {
    /// Derive the offset entry for an edit descriptor.
    pub fn from_descriptor(edit: &EditDescriptor) -> Self {
        Self {
            char_delta: edit.char_delta(),
            line_delta: edit.new_end_position.line as isize - edit.old_end_position.line as isize,
            from_char_index: edit.start_index,
            from_column: edit.start_position.column,
            from_line_row: edit.start_position.line,
            old_end_index: edit.old_end_index,
            new_end_index: edit.new_end_index,
            old_end_row: edit.old_end_position.line,
            new_end_row: edit.new_end_position.line,
        }
    }

    /// Whether this edit was a pure insertion at a single point.
    pub fn is_point_insertion(&self) -> bool {
        self.old_end_index == self.from_char_index
    }

    /// Inverse-map a single coordinate from post-edit to pre-edit space.
    ///
    /// Returns `None` when the coordinate lies strictly inside the inserted
    /// region, where no pre-edit coordinate exists.
    fn map_point_back(&self, point: usize) -> Option<usize> {
        if point <= self.from_char_index {
            Some(point)
        } else if point >= self.new_end_index {
            Some((point as isize - self.char_delta) as usize)
        } else {
            None
        }
    }

    /// Inverse-map a row from post-edit to pre-edit space.
    fn map_row_back(&self, row: usize) -> Option<usize> {
        if row <= self.from_line_row {
            Some(row)
        } else if row >= self.new_end_row {
            Some((row as isize - self.line_delta) as usize)
        } else {
            None
        }
    }

    /// Map a single coordinate from pre-edit to post-edit space.
    ///
    /// Returns `None` when the coordinate fell inside the replaced range.
    fn map_point_forward(&self, point: usize) -> Option<usize> {
        if point < self.from_char_index {
            Some(point)
        } else if point >= self.old_end_index {
            Some((point as isize + self.char_delta) as usize)
        } else {
            None
        }
    }

    /// Map a half-open span from pre-edit to post-edit space.
    ///
    /// A span may come back unchanged, shifted, extended (point insertion
    /// inside it), split into a before-part and an after-part, or collapsed
    /// to nothing when the edit consumed it. Boundary touches
    /// (`span.end == from_char_index` or `span.start == old_end_index`) are
    /// treated as *not* overlapping, so an edit never silently grows an
    /// adjacent span.
    fn map_span_forward(&self, start: usize, end: usize, out: &mut Vec<(usize, usize)>) {
        if end <= self.from_char_index {
            // Entirely before the edit.
            out.push((start, end));
        } else if start >= self.old_end_index {
            // Entirely after the replaced range: shift.
            out.push((
                (start as isize + self.char_delta) as usize,
                (end as isize + self.char_delta) as usize,
            ));
        } else if self.is_point_insertion() {
            // The insertion point is strictly inside the span: extend.
            out.push((start, (end as isize + self.char_delta) as usize));
        } else {
            // Real-width overlap: keep the part before the edit, and the part
            // after it shifted to start at the new end. A span wholly inside
            // the replaced range produces no parts.
            if start < self.from_char_index {
                out.push((start, self.from_char_index));
            }
            if end > self.old_end_index {
                out.push((
                    self.new_end_index,
                    self.new_end_index + (end - self.old_end_index),
                ));
            }
        }
    }
}

/// Append-only sequence of [`EditOffset`] entries accumulated since the last
/// analysis result that matched the live buffer.
///
/// Created empty, grows by one entry per edit, and is cleared (or drained up
/// to a dispatch point) the instant a fresh analysis batch is accepted. The
/// document session owns the lifecycle.
#[derive(Debug, Default)]
pub struct EditLedger {
    entries: Vec<EditOffset>,
}

impl EditLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one edit's offsets.
    pub fn push(&mut self, offset: EditOffset) {
        self.entries.push(offset);
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no entries (shifting is a no-op).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove the first `count` entries: the prefix an accepted analysis
    /// batch already reflects. Entries recorded after the batch was
    /// dispatched are retained.
    pub fn drain_through(&mut self, count: usize) {
        let count = count.min(self.entries.len());
        self.entries.drain(..count);
    }

    /// Recorded entries, oldest first.
    pub fn entries(&self) -> &[EditOffset] {
        &self.entries
    }

    /// Backward-map a current half-open range to analysis-time coordinates.
    ///
    /// Walks the ledger newest-to-oldest. Returns `None` ("dirty") when a
    /// boundary lands inside an edit's inserted region, or when the mapped
    /// range collapses to zero length (the range only exists because of
    /// un-analyzed edits).
    pub fn map_range_to_old(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let mut start = start;
        let mut end = end;
        for offset in self.entries.iter().rev() {
            start = offset.map_point_back(start)?;
            end = offset.map_point_back(end)?;
        }
        if start < end { Some((start, end)) } else { None }
    }

    /// Backward-map a current row to its analysis-time row.
    pub fn map_row_to_old(&self, row: usize) -> Option<usize> {
        let mut row = row;
        for offset in self.entries.iter().rev() {
            row = offset.map_row_back(row)?;
        }
        Some(row)
    }

    /// Forward-map an analysis-time half-open span to current coordinates.
    ///
    /// Walks the ledger oldest-to-newest; each edit may split a fragment, so
    /// the result is zero or more disjoint current-coordinate sub-ranges.
    /// Fragments with non-positive length are dropped rather than rendered.
    pub fn map_span_to_current(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        if start >= end {
            return Vec::new();
        }

        let mut fragments = vec![(start, end)];
        let mut next = Vec::new();
        for offset in &self.entries {
            next.clear();
            for &(s, e) in &fragments {
                offset.map_span_forward(s, e, &mut next);
            }
            std::mem::swap(&mut fragments, &mut next);
        }

        fragments.retain(|&(s, e)| s < e);
        fragments
    }

    /// Forward-map a single analysis-time coordinate to current coordinates.
    ///
    /// Returns `None` when any edit consumed the coordinate.
    pub fn map_point_to_current(&self, point: usize) -> Option<usize> {
        let mut point = point;
        for offset in &self.entries {
            point = offset.map_point_forward(point)?;
        }
        Some(point)
    }
}

//! Fold ranges and their adjustment across buffer edits.
//!
//! Fold ranges arrive with each analysis batch in analysis-time line rows.
//! Until the next batch is accepted they are shifted to current rows on
//! demand, at line granularity, by replaying the ledger of edits recorded
//! since the batch was produced. Collapse state is keyed by the fold's
//! analysis-time start row so it survives reshifting.

use std::collections::HashSet;

use crate::ledger::{EditLedger, EditOffset};

/// What kind of construct a fold range covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldKind {
    /// A function or method body.
    Function,
    /// A braced or indented block.
    Block,
    /// A multi-line comment.
    Comment,
    /// A run of import declarations.
    Imports,
}

/// A foldable region of the document, in line rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldRange {
    /// First line of the region (inclusive). The fold header.
    pub start_line: usize,
    /// Last line of the region (inclusive).
    pub end_line: usize,
    /// Construct kind, for gutter affordances.
    pub kind: FoldKind,
    /// Whether the region is currently collapsed.
    pub is_collapsed: bool,
}

impl FoldRange {
    /// Create an expanded fold range.
    pub fn new(start_line: usize, end_line: usize, kind: FoldKind) -> Self {
        Self {
            start_line,
            end_line,
            kind,
            is_collapsed: false,
        }
    }

    /// Whether `line` falls within the folded region, header included.
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Rows hidden when this fold is collapsed. The header row stays
    /// visible.
    pub fn hidden_lines(&self) -> std::ops::RangeInclusive<usize> {
        self.start_line + 1..=self.end_line
    }

    /// Collapse the region.
    pub fn collapse(&mut self) {
        self.is_collapsed = true;
    }

    /// Expand the region.
    pub fn expand(&mut self) {
        self.is_collapsed = false;
    }

    /// Flip the collapse state.
    pub fn toggle(&mut self) {
        self.is_collapsed = !self.is_collapsed;
    }
}

/// Shift a single fold range across one recorded edit.
///
/// Works at line granularity. A fold whose start line was deleted is
/// relocated to the edit row rather than dropped, so the collapse affordance
/// never vanishes mid-typing.
fn shift_fold(fold: &mut FoldRange, edit: &EditOffset) {
    if edit.line_delta == 0 {
        return;
    }
    let delta = edit.line_delta;
    let shift = |row: usize| -> usize { (row as isize + delta).max(0) as usize };

    // A newline inserted at column 0 of the fold header pushes the whole
    // fold down instead of growing it.
    if edit.is_point_insertion()
        && delta > 0
        && edit.from_column == 0
        && edit.from_line_row == fold.start_line
    {
        fold.start_line = shift(fold.start_line);
        fold.end_line = shift(fold.end_line);
        return;
    }

    if fold.end_line < edit.from_line_row {
        // Entirely above the edit.
        return;
    }
    if fold.start_line > edit.old_end_row {
        // Entirely below the edit.
        fold.start_line = shift(fold.start_line);
        fold.end_line = shift(fold.end_line);
        return;
    }
    if delta < 0 && fold.start_line > edit.from_line_row {
        // The fold's header row was deleted. Relocate to the edit row.
        fold.start_line = edit.from_line_row;
        fold.end_line = fold.start_line.max(shift(fold.end_line));
        return;
    }
    // The edit pierces the fold body; only the end moves.
    fold.end_line = fold.start_line.max(shift(fold.end_line));
}

/// The set of fold ranges from the most recent analysis batch, plus collapse
/// state.
pub struct FoldSet {
    /// Ranges in analysis-time rows, as delivered.
    ranges: Vec<FoldRange>,
    /// Analysis-time start rows of collapsed folds.
    collapsed: HashSet<usize>,
}

impl Default for FoldSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldSet {
    /// Create an empty fold set.
    pub fn new() -> Self {
        Self {
            ranges: Vec::new(),
            collapsed: HashSet::new(),
        }
    }

    /// Replace the ranges with a fresh analysis batch.
    ///
    /// Collapse state carries over for folds whose analysis-time start row
    /// is unchanged.
    pub fn replace(&mut self, ranges: Vec<FoldRange>) {
        self.collapsed
            .retain(|row| ranges.iter().any(|r| r.start_line == *row));
        self.ranges = ranges;
    }

    /// Number of fold ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the set holds no ranges.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The fold ranges shifted to current rows through the ledger, with
    /// collapse state applied.
    pub fn shifted_ranges(&self, ledger: &EditLedger) -> Vec<FoldRange> {
        let mut out = Vec::with_capacity(self.ranges.len());
        for range in &self.ranges {
            let mut fold = *range;
            fold.is_collapsed = self.collapsed.contains(&range.start_line);
            for edit in ledger.entries() {
                shift_fold(&mut fold, edit);
            }
            out.push(fold);
        }
        out
    }

    /// Whether `row` (a current display row) is hidden inside a collapsed
    /// fold.
    pub fn is_line_hidden(&self, row: usize, ledger: &EditLedger) -> bool {
        self.shifted_ranges(ledger)
            .iter()
            .any(|f| f.is_collapsed && f.hidden_lines().contains(&row))
    }

    /// Toggle the collapse state of the fold whose current header row is
    /// `row`. Returns true if a fold was found.
    pub fn toggle_at(&mut self, row: usize, ledger: &EditLedger) -> bool {
        let shifted = self.shifted_ranges(ledger);
        for (range, current) in self.ranges.iter().zip(&shifted) {
            if current.start_line == row {
                let key = range.start_line;
                if !self.collapsed.remove(&key) {
                    self.collapsed.insert(key);
                }
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::EditDescriptor;
    use crate::line_index::Position;

    fn edit(
        start: usize,
        start_pos: Position,
        old_end: usize,
        old_end_pos: Position,
        inserted: &str,
        deleted: &str,
    ) -> EditOffset {
        let inserted_chars = inserted.chars().count();
        let new_end = start + inserted_chars;
        let newline_count = inserted.matches('\n').count();
        let new_end_pos = if newline_count == 0 {
            Position::new(start_pos.line, start_pos.column + inserted_chars)
        } else {
            let last = inserted.rsplit('\n').next().unwrap();
            Position::new(start_pos.line + newline_count, last.chars().count())
        };
        EditOffset::from_descriptor(&EditDescriptor {
            start_index: start,
            old_end_index: old_end,
            new_end_index: new_end,
            start_position: start_pos,
            old_end_position: old_end_pos,
            new_end_position: new_end_pos,
            inserted_text: inserted.to_string(),
            deleted_text: deleted.to_string(),
        })
    }

    fn fold(start: usize, end: usize) -> FoldRange {
        FoldRange::new(start, end, FoldKind::Function)
    }

    #[test]
    fn test_fold_above_edit_unchanged() {
        let mut f = fold(0, 3);
        let e = edit(100, Position::new(10, 0), 100, Position::new(10, 0), "\n", "");
        shift_fold(&mut f, &e);
        assert_eq!((f.start_line, f.end_line), (0, 3));
    }

    #[test]
    fn test_fold_below_edit_shifts_whole() {
        let mut f = fold(10, 15);
        // Insert two newlines on line 2.
        let e = edit(20, Position::new(2, 0), 20, Position::new(2, 0), "a\nb\n", "");
        shift_fold(&mut f, &e);
        assert_eq!((f.start_line, f.end_line), (12, 17));
    }

    #[test]
    fn test_newline_at_header_column_zero_pushes_fold_down() {
        // Pressing Enter at column 0 of the fold header moves the fold, it
        // does not grow it.
        let mut f = fold(5, 9);
        let e = edit(50, Position::new(5, 0), 50, Position::new(5, 0), "\n", "");
        shift_fold(&mut f, &e);
        assert_eq!((f.start_line, f.end_line), (6, 10));
    }

    #[test]
    fn test_newline_inside_header_line_grows_fold() {
        // Enter pressed mid-line on the header splits the header; the body
        // grows by one line.
        let mut f = fold(5, 9);
        let e = edit(54, Position::new(5, 4), 54, Position::new(5, 4), "\n", "");
        shift_fold(&mut f, &e);
        assert_eq!((f.start_line, f.end_line), (5, 10));
    }

    #[test]
    fn test_deleted_header_relocates_to_edit_row() {
        // Deleting lines 3..=6 removes the fold's header (line 5); the fold
        // is moved to the edit row instead of disappearing.
        let mut f = fold(5, 12);
        let e = edit(
            30,
            Position::new(3, 0),
            70,
            Position::new(7, 0),
            "",
            "four\ndeleted\nlines\nhere\n",
        );
        shift_fold(&mut f, &e);
        assert_eq!(f.start_line, 3);
        assert_eq!(f.end_line, 8);
    }

    #[test]
    fn test_deletion_piercing_body_shrinks_fold() {
        let mut f = fold(2, 10);
        // Delete lines 5..=6.
        let e = edit(
            50,
            Position::new(5, 0),
            70,
            Position::new(7, 0),
            "",
            "aaaa\nbbbb\n",
        );
        shift_fold(&mut f, &e);
        assert_eq!((f.start_line, f.end_line), (2, 8));
    }

    #[test]
    fn test_end_never_precedes_start() {
        let mut f = fold(4, 5);
        // Delete many lines starting inside the fold body.
        let e = edit(
            45,
            Position::new(4, 5),
            200,
            Position::new(20, 0),
            "",
            &"x\n".repeat(16),
        );
        shift_fold(&mut f, &e);
        assert!(f.end_line >= f.start_line);
    }

    #[test]
    fn test_collapse_state_survives_shifting() {
        let mut set = FoldSet::new();
        set.replace(vec![fold(5, 9)]);
        let mut ledger = EditLedger::new();
        assert!(set.toggle_at(5, &ledger));

        // An edit above shifts the fold down one row.
        ledger.push(edit(0, Position::new(0, 0), 0, Position::new(0, 0), "\n", ""));
        let shifted = set.shifted_ranges(&ledger);
        assert_eq!(shifted[0].start_line, 6);
        assert!(shifted[0].is_collapsed);
        assert!(set.is_line_hidden(8, &ledger));
        assert!(!set.is_line_hidden(6, &ledger));

        // Toggling at its current row expands it again.
        assert!(set.toggle_at(6, &ledger));
        assert!(!set.is_line_hidden(8, &ledger));
    }

    #[test]
    fn test_replace_drops_stale_collapse_state() {
        let mut set = FoldSet::new();
        set.replace(vec![fold(2, 4)]);
        let ledger = EditLedger::new();
        set.toggle_at(2, &ledger);
        set.replace(vec![fold(7, 9)]);
        assert!(!set.is_line_hidden(3, &ledger));
        assert!(!set.is_line_hidden(8, &ledger));
    }
}

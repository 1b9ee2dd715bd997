//! The document session: one open document and all of its derived state.
//!
//! [`DocumentSession`] owns the buffer, the line index, the edit ledger, the
//! undo history, the analysis scheduler, and the render caches, and keeps
//! them consistent through every edit. Rendering reads go through
//! [`DocumentSession::line_segments`], which remaps analysis-time results to
//! current coordinates through the ledger so highlights stay glued to their
//! text while analysis is in flight.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::{
    AnalysisBatch, AnalysisScheduler, AnalysisWorker, BracketMarker, ErrorMarker, RequestId,
};
use crate::compositor::{compose_segments, LineCompositor, LineSegment};
use crate::delta::EditDescriptor;
use crate::folds::{FoldRange, FoldSet};
use crate::history::{History, HistoryEntry, MergeMode};
use crate::ledger::{EditLedger, EditOffset};
use crate::line_index::{LineIndex, Position, Selection};
use crate::spatial::SpanIndex;
use crate::storage::BufferSnapshot;

/// One open document with its full editing state.
pub struct DocumentSession {
    buffer: BufferSnapshot,
    line_index: LineIndex,
    ledger: EditLedger,
    history: History,
    scheduler: AnalysisScheduler,
    compositor: LineCompositor,
    span_index: SpanIndex,
    folds: FoldSet,
    brackets: Vec<BracketMarker>,
    errors: Vec<ErrorMarker>,
    cursor: Position,
    selection: Option<Selection>,
    buffer_generation: u64,
    analysis_generation: u64,
    last_edit_row: Option<usize>,
}

impl DocumentSession {
    /// Open a session over the given text.
    pub fn new(text: &str) -> Self {
        Self {
            buffer: BufferSnapshot::from_text(text),
            line_index: LineIndex::from_text(text),
            ledger: EditLedger::new(),
            history: History::default(),
            scheduler: AnalysisScheduler::default(),
            compositor: LineCompositor::new(),
            span_index: SpanIndex::empty(),
            folds: FoldSet::new(),
            brackets: Vec::new(),
            errors: Vec::new(),
            cursor: Position::new(0, 0),
            selection: None,
            buffer_generation: 0,
            analysis_generation: 0,
            last_edit_row: None,
        }
    }

    /// Open a session over an empty document.
    pub fn empty() -> Self {
        Self::new("")
    }

    // ---- Editing -----------------------------------------------------

    /// Insert `text` at a character offset. Empty text is a no-op.
    pub fn insert(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        self.edit(offset, 0, text);
    }

    /// Delete `length` characters starting at a character offset. Zero
    /// length is a no-op.
    pub fn delete(&mut self, offset: usize, length: usize) {
        if length == 0 {
            return;
        }
        self.edit(offset, length, "");
    }

    /// Replace `length` characters at a character offset with `text`.
    pub fn replace(&mut self, offset: usize, length: usize, text: &str) {
        if length == 0 && text.is_empty() {
            return;
        }
        self.edit(offset, length, text);
    }

    fn edit(&mut self, offset: usize, delete_len: usize, insert_text: &str) {
        let cursor_before = self.cursor;
        let selection_before = self.selection;
        let edit = self.apply_edit(offset, delete_len, insert_text);

        let merge_mode = if edit.deleted_text.is_empty()
            && edit.inserted_len() == 1
            && edit.inserted_text != "\n"
        {
            MergeMode::Insert
        } else if edit.inserted_text.is_empty() && edit.deleted_len() == 1 {
            MergeMode::Delete
        } else {
            MergeMode::None
        };
        self.history.record(HistoryEntry {
            offset: edit.start_index,
            inserted_text: edit.inserted_text,
            deleted_text: edit.deleted_text,
            cursor_before,
            cursor_after: self.cursor,
            selection_before,
            selection_after: self.selection,
            merge_mode,
            timestamp: Instant::now(),
        });
    }

    /// The single mutation path. Every buffer change, whether typed, undone,
    /// or redone, goes through here so the line index, ledger, and scheduler
    /// never drift from the buffer.
    fn apply_edit(&mut self, offset: usize, delete_len: usize, insert_text: &str) -> EditDescriptor {
        let offset = offset.min(self.buffer.char_count());
        let delete_len = delete_len.min(self.buffer.char_count() - offset);

        let deleted_text = self.buffer.slice(offset, delete_len);
        let start_position = self.line_index.offset_to_position(offset);
        let old_end_position = self.line_index.offset_to_position(offset + delete_len);

        self.buffer = self.buffer.delete(offset, delete_len).insert(offset, insert_text);
        self.line_index.apply_edit(offset, &deleted_text, insert_text);

        let new_end_index = offset + insert_text.chars().count();
        let edit = EditDescriptor {
            start_index: offset,
            old_end_index: offset + delete_len,
            new_end_index,
            start_position,
            old_end_position,
            new_end_position: self.line_index.offset_to_position(new_end_index),
            inserted_text: insert_text.to_string(),
            deleted_text,
        };

        self.ledger.push(EditOffset::from_descriptor(&edit));
        self.scheduler.enqueue(edit.clone(), Instant::now());
        self.buffer_generation += 1;
        self.last_edit_row = Some(edit.start_position.line);
        self.selection = None;
        self.cursor = edit.new_end_position;
        edit
    }

    // ---- History -----------------------------------------------------

    /// Undo the most recent edit. Returns false when there is nothing to
    /// undo.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.pop_undo() else {
            return false;
        };
        self.apply_edit(
            entry.offset,
            entry.inserted_text.chars().count(),
            &entry.deleted_text,
        );
        self.cursor = entry.cursor_before;
        self.selection = entry.selection_before;
        self.history.push_redo(entry);
        true
    }

    /// Redo the most recently undone edit. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.pop_redo() else {
            return false;
        };
        self.apply_edit(
            entry.offset,
            entry.deleted_text.chars().count(),
            &entry.inserted_text,
        );
        self.cursor = entry.cursor_after;
        self.selection = entry.selection_after;
        self.history.restore_undo(entry);
        true
    }

    /// Whether an undo is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drop all undo and redo state.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ---- Analysis ----------------------------------------------------

    /// Run a full parse now and adopt its results as the new baseline.
    pub fn parse_now<W: AnalysisWorker>(&mut self, worker: &mut W) -> Result<(), W::Error> {
        // Fresh request id; anything still in flight becomes stale.
        let (id, _) = self.scheduler.dispatch(self.ledger.len());
        let batch = worker.parse(&self.buffer.text())?;
        self.apply_analysis(id, batch);
        Ok(())
    }

    /// Dispatch pending edits if the debounce window has elapsed, and apply
    /// whatever the worker returns. Returns true when a batch was adopted.
    pub fn poll_analysis<W: AnalysisWorker>(
        &mut self,
        worker: &mut W,
        now: Instant,
    ) -> Result<bool, W::Error> {
        if !self.scheduler.is_ready(now) {
            return Ok(false);
        }
        let (id, edits) = self.scheduler.dispatch(self.ledger.len());
        match worker.apply_edits(&edits)? {
            Some(batch) => Ok(self.apply_analysis(id, batch)),
            None => {
                self.analysis_failed(id);
                Ok(false)
            }
        }
    }

    /// Adopt an analysis batch if `id` is still the latest request.
    ///
    /// Stale batches are discarded without touching the ledger. Accepting a
    /// batch retires exactly the ledger prefix that existed when `id` was
    /// dispatched; edits typed since then keep remapping the new results.
    pub fn apply_analysis(&mut self, id: RequestId, batch: AnalysisBatch) -> bool {
        if !self.scheduler.is_current(id) {
            debug!(request = id.0, "stale analysis batch discarded");
            return false;
        }
        debug!(
            request = id.0,
            highlights = batch.highlights.len(),
            errors = batch.errors.len(),
            "analysis batch adopted"
        );
        self.ledger.drain_through(self.scheduler.ledger_len_at_dispatch());
        self.span_index = SpanIndex::build(batch.highlights);
        self.folds.replace(batch.folds);
        self.brackets = batch.brackets;
        self.errors = batch.errors;
        self.compositor.clear();
        self.analysis_generation += 1;
        true
    }

    /// Note that the request `id` failed. The ledger is left alone so the
    /// previous batch keeps remapping; only the edited row's cached
    /// composition is dropped.
    pub fn analysis_failed(&mut self, id: RequestId) {
        if !self.scheduler.is_current(id) {
            return;
        }
        if let Some(row) = self.last_edit_row {
            self.compositor.invalidate_display_row(row);
        }
    }

    // ---- Rendering ---------------------------------------------------

    /// Styled segments for one display row, in line-relative offsets.
    ///
    /// Analysis-time spans and markers are remapped to current coordinates
    /// through the ledger. When a row cannot be mapped back (an edit tore
    /// through it since the last batch), the last good composition is served
    /// if the line text still matches, otherwise the row renders unstyled
    /// until the next batch lands.
    pub fn line_segments(&mut self, row: usize) -> Vec<LineSegment> {
        if row >= self.line_index.line_count() {
            return Vec::new();
        }
        let (line_start, line_end) = self.line_index.line_text_range(row);
        let text = self.buffer.slice(line_start, line_end - line_start);

        let mapped = match (
            self.ledger.map_range_to_old(line_start, line_end),
            self.ledger.map_row_to_old(row),
        ) {
            (Some(range), Some(old_row)) => Some((range, old_row)),
            _ => None,
        };
        let Some(((old_start, old_end), old_row)) = mapped else {
            return self.compositor.get_dirty(row, &text).unwrap_or_default();
        };

        if let Some(segments) = self.compositor.get_clean(old_row, &text) {
            return segments;
        }

        let mut syntax = Vec::new();
        for span in self.span_index.query(old_start, old_end) {
            for (s, e) in self.ledger.map_span_to_current(span.start, span.end) {
                let (s, e) = (s.max(line_start), e.min(line_end));
                if s < e {
                    syntax.push((s - line_start, e - line_start, span.scope));
                }
            }
        }
        let mut markers = Vec::new();
        for marker in &self.errors {
            if marker.start >= old_end || marker.end <= old_start {
                continue;
            }
            for (s, e) in self.ledger.map_span_to_current(marker.start, marker.end) {
                let (s, e) = (s.max(line_start), e.min(line_end));
                if s < e {
                    markers.push((s - line_start, e - line_start, marker.severity));
                }
            }
        }

        let segments = compose_segments(&syntax, &markers);
        self.compositor.put_clean(old_row, text.clone(), segments.clone());
        self.compositor.put_dirty(row, text, segments.clone());
        segments
    }

    /// Bracket depths on one display row, keyed by line-relative offset.
    ///
    /// Brackets whose analysis-time offset no longer maps cleanly are
    /// omitted until the next batch.
    pub fn line_bracket_depths(&self, row: usize) -> BTreeMap<usize, u32> {
        let mut out = BTreeMap::new();
        if row >= self.line_index.line_count() {
            return out;
        }
        let (line_start, line_end) = self.line_index.line_text_range(row);
        for bracket in &self.brackets {
            if let Some(offset) = self.ledger.map_point_to_current(bracket.offset)
                && offset >= line_start
                && offset < line_end
            {
                out.insert(offset - line_start, bracket.depth);
            }
        }
        out
    }

    // ---- Folds -------------------------------------------------------

    /// The fold ranges at current display rows.
    pub fn fold_ranges(&self) -> Vec<FoldRange> {
        self.folds.shifted_ranges(&self.ledger)
    }

    /// Whether a display row is hidden inside a collapsed fold.
    pub fn is_line_folded(&self, row: usize) -> bool {
        self.folds.is_line_hidden(row, &self.ledger)
    }

    /// Toggle the fold whose header is at a display row. Returns true when a
    /// fold header was found there.
    pub fn toggle_fold_at(&mut self, row: usize) -> bool {
        self.folds.toggle_at(row, &self.ledger)
    }

    // ---- Cursor and selection ---------------------------------------

    /// The cursor position.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor, clamped to the document. Clears the selection.
    pub fn set_cursor(&mut self, position: Position) {
        let offset = self.line_index.position_to_offset(position.line, position.column);
        self.cursor = self.line_index.offset_to_position(offset);
        self.selection = None;
    }

    /// The active selection, if any.
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Set the selection and move the cursor to its end.
    pub fn set_selection(&mut self, selection: Selection) {
        self.cursor = selection.end;
        self.selection = Some(selection);
    }

    /// Move the cursor one grapheme left.
    pub fn move_cursor_left(&mut self) {
        let offset = self.cursor_offset();
        if let Some(prev) = self.grapheme_boundary_before(offset) {
            self.cursor = self.line_index.offset_to_position(prev);
        }
        self.selection = None;
    }

    /// Move the cursor one grapheme right.
    pub fn move_cursor_right(&mut self) {
        let offset = self.cursor_offset();
        if let Some(next) = self.grapheme_boundary_after(offset) {
            self.cursor = self.line_index.offset_to_position(next);
        }
        self.selection = None;
    }

    fn cursor_offset(&self) -> usize {
        self.line_index.position_to_offset(self.cursor.line, self.cursor.column)
    }

    fn grapheme_boundary_before(&self, offset: usize) -> Option<usize> {
        if offset == 0 {
            return None;
        }
        let text = self.buffer.text();
        let mut pos = 0;
        for grapheme in text.graphemes(true) {
            let next = pos + grapheme.chars().count();
            if next >= offset {
                return Some(pos);
            }
            pos = next;
        }
        None
    }

    fn grapheme_boundary_after(&self, offset: usize) -> Option<usize> {
        let text = self.buffer.text();
        let mut pos = 0;
        for grapheme in text.graphemes(true) {
            let next = pos + grapheme.chars().count();
            if next > offset {
                return Some(next);
            }
            pos = next;
        }
        None
    }

    // ---- Accessors ---------------------------------------------------

    /// The current buffer snapshot. Cheap to clone.
    pub fn buffer(&self) -> &BufferSnapshot {
        &self.buffer
    }

    /// The full document text.
    pub fn text(&self) -> String {
        self.buffer.text().to_string()
    }

    /// Number of lines in the document.
    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    /// Text of one line, excluding the trailing newline.
    pub fn line_text(&self, row: usize) -> String {
        let (start, end) = self.line_index.line_text_range(row);
        self.buffer.slice(start, end - start)
    }

    /// Counter bumped on every buffer mutation.
    pub fn buffer_generation(&self) -> u64 {
        self.buffer_generation
    }

    /// Counter bumped every time an analysis batch is adopted.
    pub fn analysis_generation(&self) -> u64 {
        self.analysis_generation
    }

    /// Number of ledger entries awaiting the next accepted batch.
    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }
}

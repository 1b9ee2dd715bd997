//! Incremental line index.
//!
//! Maintains a monotonically increasing table of line-start character offsets
//! derived from a buffer snapshot. Offset/position conversion is O(log n)
//! binary search; [`LineIndex::apply_edit`] patches the table in
//! O(affected-line-count + tail-shift-count) and never rescans the whole
//! document.

/// A logical position: zero-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based character column within the line.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A selection range between two logical positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Anchor position (where the selection started).
    pub start: Position,
    /// Active position (where the caret is).
    pub end: Position,
}

impl Selection {
    /// Create a new selection.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether the selection is empty (a bare caret).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Line index over character offsets.
pub struct LineIndex {
    /// Start offset of each line; entry 0 is always 0, strictly increasing.
    line_starts: Vec<usize>,
    /// Total character count of the indexed document.
    char_count: usize,
}

impl LineIndex {
    /// Create an index for the empty document (one empty line).
    pub fn new() -> Self {
        Self {
            line_starts: vec![0],
            char_count: 0,
        }
    }

    /// Build the index from text with a single scan.
    pub fn from_text(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in text.chars().enumerate() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            char_count: text.chars().count(),
        }
    }

    /// Total line count.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Total character count of the indexed document.
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Start offset of the specified line (clamped to the last line).
    pub fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.line_starts.len() - 1);
        self.line_starts[line]
    }

    /// Exclusive end offset of the specified line, including its newline.
    pub fn line_end(&self, line: usize) -> usize {
        let line = line.min(self.line_starts.len() - 1);
        if line + 1 < self.line_starts.len() {
            self.line_starts[line + 1]
        } else {
            self.char_count
        }
    }

    /// Half-open character range of the specified line, excluding the
    /// trailing newline.
    pub fn line_text_range(&self, line: usize) -> (usize, usize) {
        let line = line.min(self.line_starts.len() - 1);
        let start = self.line_starts[line];
        let end = if line + 1 < self.line_starts.len() {
            self.line_starts[line + 1] - 1
        } else {
            self.char_count
        };
        (start, end)
    }

    /// Character length of the specified line, excluding the newline.
    pub fn line_len(&self, line: usize) -> usize {
        let (start, end) = self.line_text_range(line);
        end - start
    }

    /// Convert a character offset to a logical position via binary search.
    ///
    /// Offsets past the end of the document are clamped.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.char_count);
        // Last line whose start is <= offset.
        let line = self.line_starts.partition_point(|&s| s <= offset) - 1;
        Position::new(line, offset - self.line_starts[line])
    }

    /// Convert a logical position to a character offset.
    ///
    /// The line is clamped to the document and the column to the line length
    /// (excluding the newline), matching interactive cursor semantics.
    pub fn position_to_offset(&self, line: usize, column: usize) -> usize {
        let line = line.min(self.line_starts.len() - 1);
        self.line_starts[line] + column.min(self.line_len(line))
    }

    /// Patch the index for an edit that replaced `deleted_text` with
    /// `inserted_text` at `start_offset`.
    ///
    /// Locates the first affected line via binary search, splices line-start
    /// entries for removed/inserted newlines, and shifts every subsequent
    /// entry by the character delta. No full rescan.
    pub fn apply_edit(&mut self, start_offset: usize, deleted_text: &str, inserted_text: &str) {
        let deleted_len = deleted_text.chars().count();
        let inserted_len = inserted_text.chars().count();
        let char_delta = inserted_len as isize - deleted_len as isize;

        // First line-start entry strictly after the edit start. Every line
        // start removed by the deletion sits in the next `removed` slots.
        let splice_at = self.line_starts.partition_point(|&s| s <= start_offset);
        let removed = deleted_text.matches('\n').count();

        let mut new_starts = Vec::new();
        let mut pos = start_offset;
        for ch in inserted_text.chars() {
            pos += 1;
            if ch == '\n' {
                new_starts.push(pos);
            }
        }
        let added = new_starts.len();

        self.line_starts
            .splice(splice_at..splice_at + removed, new_starts);

        for start in &mut self.line_starts[splice_at + added..] {
            *start = (*start as isize + char_delta) as usize;
        }

        self.char_count = (self.char_count as isize + char_delta) as usize;
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

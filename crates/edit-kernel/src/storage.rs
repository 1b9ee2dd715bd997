//! Piece-table text storage with immutable snapshots.
//!
//! Every edit produces a *new* [`BufferSnapshot`]; the previous snapshot stays
//! fully valid and cheap to retain because pieces reference shared, immutable
//! text chunks. This is what makes undo/redo replay correct without
//! re-deriving state.

use std::sync::{Arc, OnceLock};

/// Buffer type identifier for a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    /// References the read-only text the snapshot chain was created from.
    Original,
    /// References an immutable chunk produced by a single insertion.
    Added,
}

/// Piece structure: references a fragment of an immutable text chunk.
#[derive(Debug, Clone)]
pub struct Piece {
    /// Which pool this piece came from.
    pub kind: PieceKind,
    /// The shared chunk this piece points into.
    chunk: Arc<str>,
    /// Start position within the chunk (byte offset).
    pub start: usize,
    /// Byte length of the fragment.
    pub byte_length: usize,
    /// Character count of the fragment (handles UTF-8 multi-byte characters).
    pub char_count: usize,
}

impl Piece {
    fn new(kind: PieceKind, chunk: Arc<str>, start: usize, byte_length: usize) -> Self {
        let char_count = chunk[start..start + byte_length].chars().count();
        Self {
            kind,
            chunk,
            start,
            byte_length,
            char_count,
        }
    }

    fn as_str(&self) -> &str {
        &self.chunk[self.start..self.start + self.byte_length]
    }

    /// Split this piece at the specified character offset.
    /// Returns `(left_piece, right_piece)`.
    fn split(&self, char_offset: usize) -> (Piece, Piece) {
        // `char_offset` is relative to this piece; convert it to a UTF-8 byte
        // offset within the chunk to complete the split.
        let byte_offset = self
            .as_str()
            .char_indices()
            .nth(char_offset)
            .map(|(i, _)| i)
            .unwrap_or(self.byte_length);

        let left = Piece {
            kind: self.kind,
            chunk: Arc::clone(&self.chunk),
            start: self.start,
            byte_length: byte_offset,
            char_count: char_offset,
        };
        let right = Piece {
            kind: self.kind,
            chunk: Arc::clone(&self.chunk),
            start: self.start + byte_offset,
            byte_length: self.byte_length - byte_offset,
            char_count: self.char_count - char_offset,
        };
        (left, right)
    }

    fn can_merge_with(&self, next: &Piece) -> bool {
        self.kind == next.kind
            && Arc::ptr_eq(&self.chunk, &next.chunk)
            && self.start + self.byte_length == next.start
    }

    fn merged_with(&self, next: &Piece) -> Piece {
        Piece {
            kind: self.kind,
            chunk: Arc::clone(&self.chunk),
            start: self.start,
            byte_length: self.byte_length + next.byte_length,
            char_count: self.char_count + next.char_count,
        }
    }
}

/// An immutable snapshot of the document text.
///
/// Cloning a snapshot is cheap (two `Arc` bumps). [`insert`](Self::insert) and
/// [`delete`](Self::delete) return new snapshots; offsets are character
/// offsets and out-of-range inputs are clamped, never errors.
#[derive(Clone)]
pub struct BufferSnapshot {
    /// Ordered list of pieces covering the whole document.
    pieces: Arc<Vec<Piece>>,
    /// Total character count (sum of piece char counts).
    char_count: usize,
    /// Lazily materialized full text, memoized per snapshot.
    text_cache: Arc<OnceLock<Arc<str>>>,
}

impl BufferSnapshot {
    /// Create a snapshot from original text.
    pub fn from_text(text: &str) -> Self {
        let pieces = if text.is_empty() {
            Vec::new()
        } else {
            let chunk: Arc<str> = Arc::from(text);
            let byte_length = chunk.len();
            vec![Piece::new(PieceKind::Original, chunk, 0, byte_length)]
        };
        let char_count = pieces.iter().map(|p| p.char_count).sum();

        Self {
            pieces: Arc::new(pieces),
            char_count,
            text_cache: Arc::new(OnceLock::new()),
        }
    }

    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Total character count of the document.
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.char_count == 0
    }

    /// Number of pieces in this snapshot.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Insert text at the specified character offset, returning a new snapshot.
    ///
    /// The offset is clamped to `[0, char_count]`.
    pub fn insert(&self, offset: usize, text: &str) -> BufferSnapshot {
        if text.is_empty() {
            return self.clone();
        }

        let offset = offset.min(self.char_count);
        let chunk: Arc<str> = Arc::from(text);
        let byte_length = chunk.len();
        let new_piece = Piece::new(PieceKind::Added, chunk, 0, byte_length);
        let inserted_chars = new_piece.char_count;

        let mut pieces: Vec<Piece> = Vec::with_capacity(self.pieces.len() + 2);
        let mut remaining = offset;
        let mut inserted = false;

        for piece in self.pieces.iter() {
            if inserted {
                pieces.push(piece.clone());
                continue;
            }
            if remaining == 0 {
                pieces.push(new_piece.clone());
                inserted = true;
                pieces.push(piece.clone());
            } else if remaining < piece.char_count {
                let (left, right) = piece.split(remaining);
                pieces.push(left);
                pieces.push(new_piece.clone());
                inserted = true;
                pieces.push(right);
            } else {
                remaining -= piece.char_count;
                pieces.push(piece.clone());
            }
        }
        if !inserted {
            // Empty document or insertion at the very end.
            pieces.push(new_piece);
        }

        Self::merge_adjacent(&mut pieces);

        BufferSnapshot {
            pieces: Arc::new(pieces),
            char_count: self.char_count + inserted_chars,
            text_cache: Arc::new(OnceLock::new()),
        }
    }

    /// Delete characters in the specified range, returning a new snapshot.
    ///
    /// The start offset is clamped to `[0, char_count]` and the length is
    /// truncated at the end of the document.
    pub fn delete(&self, offset: usize, length: usize) -> BufferSnapshot {
        let start = offset.min(self.char_count);
        let length = length.min(self.char_count - start);
        if length == 0 {
            return self.clone();
        }
        let end = start + length;

        let mut pieces: Vec<Piece> = Vec::with_capacity(self.pieces.len() + 1);
        let mut current = 0usize;

        for piece in self.pieces.iter() {
            let piece_end = current + piece.char_count;

            if piece_end <= start || current >= end {
                // Entirely before or after the deleted range.
                pieces.push(piece.clone());
            } else {
                // Some part of this piece survives on the left and/or right.
                if current < start {
                    let (left, _) = piece.split(start - current);
                    pieces.push(left);
                }
                if piece_end > end {
                    let (_, right) = piece.split(end - current);
                    pieces.push(right);
                }
            }

            current = piece_end;
        }

        Self::merge_adjacent(&mut pieces);

        BufferSnapshot {
            pieces: Arc::new(pieces),
            char_count: self.char_count - length,
            text_cache: Arc::new(OnceLock::new()),
        }
    }

    /// Get the entire document content.
    ///
    /// The materialized text is memoized per snapshot; repeated calls are
    /// cheap and never invalidated by reads.
    pub fn text(&self) -> Arc<str> {
        Arc::clone(self.text_cache.get_or_init(|| {
            let mut result = String::with_capacity(self.byte_count());
            for piece in self.pieces.iter() {
                result.push_str(piece.as_str());
            }
            Arc::from(result)
        }))
    }

    /// Get text in the specified character range (clamped to the document).
    pub fn slice(&self, offset: usize, length: usize) -> String {
        let start = offset.min(self.char_count);
        let length = length.min(self.char_count - start);
        let end = start + length;

        let mut result = String::new();
        let mut current = 0usize;

        for piece in self.pieces.iter() {
            let piece_end = current + piece.char_count;
            if current >= end {
                break;
            }
            if piece_end > start {
                let skip = start.saturating_sub(current);
                let take = (end - current).min(piece.char_count) - skip;
                result.extend(piece.as_str().chars().skip(skip).take(take));
            }
            current = piece_end;
        }

        result
    }

    /// Get the total byte count of the document.
    pub fn byte_count(&self) -> usize {
        self.pieces.iter().map(|p| p.byte_length).sum()
    }

    /// Merge adjacent pieces that reference contiguous fragments of the same
    /// chunk, bounding piece-list growth across edits.
    fn merge_adjacent(pieces: &mut Vec<Piece>) {
        let mut i = 0;
        while i + 1 < pieces.len() {
            if pieces[i].can_merge_with(&pieces[i + 1]) {
                let merged = pieces[i].merged_with(&pieces[i + 1]);
                pieces.splice(i..=i + 1, [merged]);
            } else {
                i += 1;
            }
        }
    }
}

impl std::fmt::Debug for BufferSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferSnapshot")
            .field("char_count", &self.char_count)
            .field("piece_count", &self.pieces.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_snapshot() {
        let buf = BufferSnapshot::from_text("Hello, World!");
        assert_eq!(&*buf.text(), "Hello, World!");
        assert_eq!(buf.char_count(), 13);
    }

    #[test]
    fn test_empty_snapshot() {
        let buf = BufferSnapshot::empty();
        assert_eq!(&*buf.text(), "");
        assert_eq!(buf.char_count(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_insert_at_start() {
        let buf = BufferSnapshot::from_text("World");
        let buf = buf.insert(0, "Hello, ");
        assert_eq!(&*buf.text(), "Hello, World");
    }

    #[test]
    fn test_insert_at_end() {
        let buf = BufferSnapshot::from_text("Hello");
        let buf = buf.insert(5, ", World");
        assert_eq!(&*buf.text(), "Hello, World");
    }

    #[test]
    fn test_insert_in_middle() {
        let buf = BufferSnapshot::from_text("Hlo");
        let buf = buf.insert(1, "el");
        assert_eq!(&*buf.text(), "Hello");
    }

    #[test]
    fn test_insert_offset_clamped() {
        let buf = BufferSnapshot::from_text("abc");
        let buf = buf.insert(100, "!");
        assert_eq!(&*buf.text(), "abc!");
    }

    #[test]
    fn test_delete_at_start() {
        let buf = BufferSnapshot::from_text("Hello, World");
        let buf = buf.delete(0, 7);
        assert_eq!(&*buf.text(), "World");
    }

    #[test]
    fn test_delete_at_end() {
        let buf = BufferSnapshot::from_text("Hello, World");
        let buf = buf.delete(5, 7);
        assert_eq!(&*buf.text(), "Hello");
    }

    #[test]
    fn test_delete_in_middle() {
        let buf = BufferSnapshot::from_text("Hello, World");
        let buf = buf.delete(5, 2);
        assert_eq!(&*buf.text(), "HelloWorld");
    }

    #[test]
    fn test_delete_truncated_past_end() {
        let buf = BufferSnapshot::from_text("Hello");
        let buf = buf.delete(3, 100);
        assert_eq!(&*buf.text(), "Hel");
    }

    #[test]
    fn test_previous_snapshot_stays_valid() {
        let base = BufferSnapshot::from_text("Hello");
        let edited = base.insert(5, " World");
        let edited2 = edited.delete(0, 5);

        assert_eq!(&*base.text(), "Hello");
        assert_eq!(&*edited.text(), "Hello World");
        assert_eq!(&*edited2.text(), " World");
    }

    #[test]
    fn test_multiple_operations() {
        let buf = BufferSnapshot::from_text("Hello");
        let buf = buf.insert(5, " World");
        let buf = buf.insert(5, ",");
        let buf = buf.delete(0, 7);
        let buf = buf.insert(0, "Hi, ");
        assert_eq!(&*buf.text(), "Hi, World");
    }

    #[test]
    fn test_utf8_chinese() {
        let buf = BufferSnapshot::from_text("你好");
        assert_eq!(buf.char_count(), 2);
        assert_eq!(buf.byte_count(), 6);

        let buf = buf.insert(1, "们");
        assert_eq!(&*buf.text(), "你们好");
        assert_eq!(buf.char_count(), 3);
    }

    #[test]
    fn test_utf8_emoji() {
        let buf = BufferSnapshot::from_text("Hello 👋");
        let buf = buf.insert(6, "World ");
        assert_eq!(&*buf.text(), "Hello World 👋");
    }

    #[test]
    fn test_slice() {
        let buf = BufferSnapshot::from_text("Hello, World!");
        assert_eq!(buf.slice(0, 5), "Hello");
        assert_eq!(buf.slice(7, 5), "World");
        assert_eq!(buf.slice(0, 13), "Hello, World!");
        assert_eq!(buf.slice(10, 100), "ld!");
    }

    #[test]
    fn test_piece_merging_after_delete() {
        // Inserting splits the original piece; deleting the inserted text must
        // rejoin the two halves into a single contiguous piece.
        let buf = BufferSnapshot::from_text("Hello");
        let split = buf.insert(2, "X");
        assert_eq!(split.piece_count(), 3);
        let rejoined = split.delete(2, 1);
        assert_eq!(&*rejoined.text(), "Hello");
        assert_eq!(rejoined.piece_count(), 1);
    }

    #[test]
    fn test_text_memoized() {
        let buf = BufferSnapshot::from_text("memo");
        let a = buf.text();
        let b = buf.text();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_insert_delete_round_trip() {
        let base = BufferSnapshot::from_text("function f() {}\n");
        for offset in [0usize, 3, 8, 16, 99] {
            for text in ["x", "  ", "line\nbreak", "你好"] {
                let len = text.chars().count();
                let clamped = offset.min(base.char_count());
                let round = base.insert(offset, text).delete(clamped, len);
                assert_eq!(
                    &*round.text(),
                    &*base.text(),
                    "offset={offset} text={text:?}"
                );
            }
        }
    }

    #[test]
    fn test_char_count_invariant() {
        let mut buf = BufferSnapshot::from_text("abc\ndef");
        for i in 0..20 {
            buf = buf.insert(i % (buf.char_count() + 1), "xy");
            buf = buf.delete(i % (buf.char_count() + 1), 1);
            assert_eq!(buf.char_count(), buf.text().chars().count());
        }
    }
}

//! Per-line composition of syntax spans and error markers into flat segments.
//!
//! The renderer consumes a list of non-overlapping [`LineSegment`]s per line,
//! each carrying every scope and severity active over its range. Composition
//! is a boundary sweep: collect all fragment boundaries on the line, then
//! emit one segment per boundary interval with its active set.
//!
//! Two bounded caches sit in front of composition. The clean cache is keyed
//! by analysis-time row and holds lines whose analysis results need no
//! remapping. The dirty cache is keyed by display row and holds the last
//! good composition for lines that have drifted since the results were
//! produced; a hit is only served when the cached line text still matches.

use std::collections::HashMap;

use crate::style::{Scope, Severity};

/// Maximum number of lines held in each cache.
const CACHE_CAPACITY: usize = 500;

/// One non-overlapping run of styled text within a line.
///
/// Offsets are line-relative character indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSegment {
    /// Start offset within the line (inclusive).
    pub start: usize,
    /// End offset within the line (exclusive).
    pub end: usize,
    /// Syntax scopes active over this run.
    pub scopes: Vec<Scope>,
    /// Diagnostic severities active over this run.
    pub severities: Vec<Severity>,
}

impl LineSegment {
    /// All style class names for this segment, space separated.
    pub fn class_names(&self) -> String {
        let mut names: Vec<&str> = self.scopes.iter().map(|s| s.class_name()).collect();
        names.extend(self.severities.iter().map(|s| s.class_name()));
        names.join(" ")
    }

    /// Whether the segment carries no styling at all.
    pub fn is_plain(&self) -> bool {
        self.scopes.is_empty() && self.severities.is_empty()
    }
}

/// Merge line-relative syntax and marker fragments into flat segments.
///
/// Fragments may overlap freely. The output segments are sorted, disjoint,
/// and cover exactly the union of input fragment ranges; gaps between
/// fragments produce no segment.
pub fn compose_segments(
    syntax: &[(usize, usize, Scope)],
    markers: &[(usize, usize, Severity)],
) -> Vec<LineSegment> {
    let mut boundaries: Vec<usize> = Vec::with_capacity((syntax.len() + markers.len()) * 2);
    for &(start, end, _) in syntax {
        boundaries.push(start);
        boundaries.push(end);
    }
    for &(start, end, _) in markers {
        boundaries.push(start);
        boundaries.push(end);
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut segments = Vec::new();
    for pair in boundaries.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let scopes: Vec<Scope> = syntax
            .iter()
            .filter(|&&(s, e, _)| s <= a && e >= b)
            .map(|&(_, _, scope)| scope)
            .collect();
        let severities: Vec<Severity> = markers
            .iter()
            .filter(|&&(s, e, _)| s <= a && e >= b)
            .map(|&(_, _, sev)| sev)
            .collect();
        if scopes.is_empty() && severities.is_empty() {
            continue;
        }
        segments.push(LineSegment {
            start: a,
            end: b,
            scopes,
            severities,
        });
    }
    segments
}

struct CacheEntry {
    text: String,
    segments: Vec<LineSegment>,
    stamp: u64,
}

/// Bounded least-recently-used map from row to cached composition.
struct LruCache {
    entries: HashMap<usize, CacheEntry>,
    counter: u64,
}

impl LruCache {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            counter: 0,
        }
    }

    fn get(&mut self, row: usize, text: &str) -> Option<&[LineSegment]> {
        self.counter += 1;
        let stamp = self.counter;
        let entry = self.entries.get_mut(&row)?;
        if entry.text != text {
            return None;
        }
        entry.stamp = stamp;
        Some(&entry.segments)
    }

    fn put(&mut self, row: usize, text: String, segments: Vec<LineSegment>) {
        self.counter += 1;
        if self.entries.len() >= CACHE_CAPACITY && !self.entries.contains_key(&row) {
            // Evict the least recently touched entry.
            if let Some(&oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.stamp)
                .map(|(row, _)| row)
            {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            row,
            CacheEntry {
                text,
                segments,
                stamp: self.counter,
            },
        );
    }

    fn remove(&mut self, row: usize) {
        self.entries.remove(&row);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Dual-cache front end for line composition.
pub struct LineCompositor {
    clean: LruCache,
    dirty: LruCache,
}

impl Default for LineCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCompositor {
    /// Create a compositor with empty caches.
    pub fn new() -> Self {
        Self {
            clean: LruCache::new(),
            dirty: LruCache::new(),
        }
    }

    /// Look up a clean composition keyed by analysis-time row.
    ///
    /// Hits require the cached line text to match `text` exactly.
    pub fn get_clean(&mut self, old_row: usize, text: &str) -> Option<Vec<LineSegment>> {
        self.clean.get(old_row, text).map(|s| s.to_vec())
    }

    /// Store a clean composition keyed by analysis-time row.
    pub fn put_clean(&mut self, old_row: usize, text: String, segments: Vec<LineSegment>) {
        self.clean.put(old_row, text, segments);
    }

    /// Look up the last good composition for a drifted line, keyed by
    /// display row.
    pub fn get_dirty(&mut self, display_row: usize, text: &str) -> Option<Vec<LineSegment>> {
        self.dirty.get(display_row, text).map(|s| s.to_vec())
    }

    /// Store a composition keyed by display row, for reuse while the line's
    /// analysis results are stale.
    pub fn put_dirty(&mut self, display_row: usize, text: String, segments: Vec<LineSegment>) {
        self.dirty.put(display_row, text, segments);
    }

    /// Drop any cached composition for a display row from both caches.
    pub fn invalidate_display_row(&mut self, row: usize) {
        self.clean.remove(row);
        self.dirty.remove(row);
    }

    /// Drop all cached compositions. Called when a fresh analysis batch is
    /// accepted.
    pub fn clear(&mut self) {
        self.clean.clear();
        self.dirty.clear();
    }

    /// Number of entries currently held in the (clean, dirty) caches.
    pub fn cache_sizes(&self) -> (usize, usize) {
        (self.clean.len(), self.dirty.len())
    }
}

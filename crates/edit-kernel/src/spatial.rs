//! Chunked spatial index over a batch of highlight spans.
//!
//! Built once per analysis batch and queried per rendered line. Spans are
//! bucketed by fixed-size character chunks; spans covering many chunks are
//! kept on a separate list checked on every query, which bounds the cost for
//! pathological huge comment/string blocks while keeping the common case
//! close to O(1).

use crate::style::Scope;

/// Chunk size, in characters, for span bucketing.
pub const CHUNK_SIZE: usize = 512;

/// Spans overlapping more than this many chunks go on the large-span list
/// instead of being bucketed.
const LARGE_SPAN_CHUNK_LIMIT: usize = 10;

/// A highlight span in analysis-time character coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Syntax scope of the span.
    pub scope: Scope,
}

impl HighlightSpan {
    /// Create a new highlight span.
    pub fn new(start: usize, end: usize, scope: Scope) -> Self {
        Self { start, end, scope }
    }
}

/// Spatial index over one immutable batch of highlight spans.
pub struct SpanIndex {
    spans: Vec<HighlightSpan>,
    /// Per-chunk span indices, in batch order.
    buckets: Vec<Vec<u32>>,
    /// Spans too wide to bucket; checked unconditionally on every query.
    large: Vec<u32>,
}

impl SpanIndex {
    /// Build the index for a batch of spans.
    pub fn build(spans: Vec<HighlightSpan>) -> Self {
        let max_end = spans.iter().map(|s| s.end).max().unwrap_or(0);
        let bucket_count = max_end / CHUNK_SIZE + 1;
        let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); bucket_count];
        let mut large = Vec::new();

        for (id, span) in spans.iter().enumerate() {
            if span.start >= span.end {
                continue;
            }
            let first = span.start / CHUNK_SIZE;
            let last = (span.end - 1) / CHUNK_SIZE;
            if last - first + 1 > LARGE_SPAN_CHUNK_LIMIT {
                large.push(id as u32);
            } else {
                for bucket in &mut buckets[first..=last] {
                    bucket.push(id as u32);
                }
            }
        }

        Self {
            spans,
            buckets,
            large,
        }
    }

    /// Build an index with no spans.
    pub fn empty() -> Self {
        Self::build(Vec::new())
    }

    /// Number of spans in the indexed batch.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// All spans in the indexed batch.
    pub fn spans(&self) -> &[HighlightSpan] {
        &self.spans
    }

    /// Query all spans intersecting the half-open range `[start, end)`.
    ///
    /// Unions the buckets the range falls in with the large-span list. When
    /// the query hits exactly one bucket and there are no large spans, the
    /// bucket is scanned directly without the sort/dedup pass.
    pub fn query(&self, start: usize, end: usize) -> Vec<&HighlightSpan> {
        if start >= end || self.buckets.is_empty() {
            return Vec::new();
        }

        let first = (start / CHUNK_SIZE).min(self.buckets.len() - 1);
        let last = ((end - 1) / CHUNK_SIZE).min(self.buckets.len() - 1);

        if first == last && self.large.is_empty() {
            // Fast path: one bucket, nothing to dedup.
            return self.buckets[first]
                .iter()
                .map(|&id| &self.spans[id as usize])
                .filter(|span| span.start < end && span.end > start)
                .collect();
        }

        let mut candidates: Vec<u32> = Vec::new();
        for bucket in &self.buckets[first..=last] {
            candidates.extend_from_slice(bucket);
        }
        candidates.extend_from_slice(&self.large);

        // The same span id appears in every chunk it overlaps; sort and drop
        // adjacent duplicates before materializing.
        candidates.sort_unstable();
        candidates.dedup();

        let mut result: Vec<&HighlightSpan> = candidates
            .into_iter()
            .map(|id| &self.spans[id as usize])
            .filter(|span| span.start < end && span.end > start)
            .collect();
        result.sort_by_key(|span| span.start);
        result
    }
}

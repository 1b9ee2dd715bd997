//! Analysis scheduling and the worker contract.
//!
//! The session never blocks on analysis. Edits accumulate in the scheduler;
//! once the debounce window has passed with no further typing, the pending
//! edits are dispatched to a worker under a fresh request id. Results are
//! tagged with the id they answer; only the latest dispatched request may be
//! applied, everything older is discarded on arrival.
//!
//! Time is passed in explicitly so scheduling is deterministic under test.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::delta::EditDescriptor;
use crate::folds::FoldRange;
use crate::spatial::HighlightSpan;
use crate::style::Severity;

/// Default quiet period before pending edits are dispatched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A matched-bracket marker at an absolute character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketMarker {
    /// Character offset of the bracket.
    pub offset: usize,
    /// Nesting depth, outermost is zero.
    pub depth: u32,
}

/// A diagnostic produced by analysis, in analysis-time offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMarker {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Diagnostic severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

/// Everything one analysis pass produces.
#[derive(Debug, Clone, Default)]
pub struct AnalysisBatch {
    /// Syntax highlight spans.
    pub highlights: Vec<HighlightSpan>,
    /// Foldable regions.
    pub folds: Vec<FoldRange>,
    /// Matched-bracket markers.
    pub brackets: Vec<BracketMarker>,
    /// Diagnostics.
    pub errors: Vec<ErrorMarker>,
}

/// Monotonically increasing identifier for one dispatched analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// The contract an analysis backend implements.
///
/// `parse` is the full-document baseline; `apply_edits` is the incremental
/// path and may return `Ok(None)` when the backend cannot produce results
/// for this round.
pub trait AnalysisWorker {
    /// Backend-specific failure type.
    type Error;

    /// Analyze the full document text from scratch.
    fn parse(&mut self, text: &str) -> Result<AnalysisBatch, Self::Error>;

    /// Analyze incrementally given the edits since the last round.
    fn apply_edits(
        &mut self,
        edits: &[EditDescriptor],
    ) -> Result<Option<AnalysisBatch>, Self::Error>;
}

/// Debounced dispatcher for analysis requests.
pub struct AnalysisScheduler {
    pending: Vec<EditDescriptor>,
    debounce: Duration,
    last_edit_at: Option<Instant>,
    next_request: u64,
    latest_dispatched: Option<RequestId>,
    ledger_len_at_dispatch: usize,
}

impl AnalysisScheduler {
    /// Create a scheduler with the given debounce window.
    pub fn new(debounce: Duration) -> Self {
        Self {
            pending: Vec::new(),
            debounce,
            last_edit_at: None,
            next_request: 0,
            latest_dispatched: None,
            ledger_len_at_dispatch: 0,
        }
    }

    /// Queue an edit, restarting the debounce window.
    pub fn enqueue(&mut self, edit: EditDescriptor, now: Instant) {
        self.pending.push(edit);
        self.last_edit_at = Some(now);
    }

    /// Whether pending edits exist and the debounce window has elapsed.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_edit_at {
            Some(at) if !self.pending.is_empty() => now.duration_since(at) >= self.debounce,
            _ => false,
        }
    }

    /// Take the pending edits for dispatch under a fresh request id.
    ///
    /// `ledger_len` is the current length of the edit ledger; when this
    /// request's results are accepted, exactly that prefix of the ledger is
    /// retired.
    pub fn dispatch(&mut self, ledger_len: usize) -> (RequestId, Vec<EditDescriptor>) {
        self.next_request += 1;
        let id = RequestId(self.next_request);
        self.latest_dispatched = Some(id);
        self.ledger_len_at_dispatch = ledger_len;
        self.last_edit_at = None;
        let edits = std::mem::take(&mut self.pending);
        debug!(request = id.0, edits = edits.len(), "analysis dispatched");
        (id, edits)
    }

    /// Whether `id` is the most recently dispatched request. Results for any
    /// other id are stale.
    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest_dispatched == Some(id)
    }

    /// Ledger length captured when the latest request was dispatched.
    pub fn ledger_len_at_dispatch(&self) -> usize {
        self.ledger_len_at_dispatch
    }

    /// Number of edits waiting for the next dispatch.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for AnalysisScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

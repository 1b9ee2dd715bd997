#![warn(missing_docs)]
//! Edit Kernel - Headless Text-Editing Core with Asynchronous Analysis
//!
//! # Overview
//!
//! `edit-kernel` is a headless editing core for code editors. It owns the
//! document text, the undo history, and every piece of derived render state,
//! and it solves the central problem of asynchronous editors: analysis
//! results (highlights, folds, diagnostics, bracket matches) are computed
//! against a snapshot that is stale by the time they arrive, and must be
//! remapped onto the live buffer instead of being thrown away.
//!
//! # Core Features
//!
//! - **Immutable Text Storage**: Piece-table snapshots with structural
//!   sharing; cheap clones, no copy on edit
//! - **Incremental Line Index**: line-start offset table spliced per edit,
//!   never rebuilt
//! - **Edit Ledger**: per-edit offset records that remap stale analysis
//!   coordinates to the live buffer, in both directions
//! - **Spatial Highlight Index**: chunked span buckets, near O(1) per-line
//!   queries
//! - **Line Compositor**: boundary-sweep merge of highlights and
//!   diagnostics into flat segments, behind bounded caches
//! - **Code Folding**: line-granularity fold shifting that survives edits
//!   between analysis rounds
//! - **Undo/Redo**: typing-run coalescing, bounded depth
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  DocumentSession (edits, undo, analysis)    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Compositor & Caches (LineSegment)          │  ← Rendering Data
//! ├─────────────────────────────────────────────┤
//! │  Spatial Index, Folds, Markers              │  ← Analysis Results
//! ├─────────────────────────────────────────────┤
//! │  Edit Ledger (stale-coordinate remapping)   │  ← Coordinate Bridge
//! ├─────────────────────────────────────────────┤
//! │  Line Index (incremental offset table)      │  ← Line Access
//! ├─────────────────────────────────────────────┤
//! │  Piece Table Snapshots                      │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Editing and History
//!
//! ```rust
//! use edit_kernel::{DocumentSession, Position};
//!
//! let mut session = DocumentSession::new("fn main() {}\n");
//!
//! session.insert(11, " body ");
//! assert_eq!(session.text(), "fn main() { body }\n");
//! assert_eq!(session.cursor(), Position::new(0, 17));
//!
//! assert!(session.undo());
//! assert_eq!(session.text(), "fn main() {}\n");
//! ```
//!
//! ## Wiring an Analysis Worker
//!
//! ```rust
//! use edit_kernel::{
//!     AnalysisBatch, AnalysisWorker, DocumentSession, EditDescriptor, HighlightSpan, Scope,
//! };
//!
//! struct KeywordWorker;
//!
//! impl AnalysisWorker for KeywordWorker {
//!     type Error = std::convert::Infallible;
//!
//!     fn parse(&mut self, text: &str) -> Result<AnalysisBatch, Self::Error> {
//!         let highlights = text
//!             .match_indices("fn")
//!             .map(|(i, _)| HighlightSpan::new(i, i + 2, Scope::Keyword))
//!             .collect();
//!         Ok(AnalysisBatch { highlights, ..Default::default() })
//!     }
//!
//!     fn apply_edits(
//!         &mut self,
//!         _edits: &[EditDescriptor],
//!     ) -> Result<Option<AnalysisBatch>, Self::Error> {
//!         Ok(None)
//!     }
//! }
//!
//! let mut session = DocumentSession::new("fn main() {}\n");
//! let mut worker = KeywordWorker;
//! session.parse_now(&mut worker).unwrap();
//!
//! let segments = session.line_segments(0);
//! assert_eq!(segments[0].class_names(), "tok-keyword");
//!
//! // Highlights stay glued to their text while the next analysis round is
//! // still pending.
//! session.insert(0, "// header\n");
//! assert_eq!(session.line_segments(1)[0].class_names(), "tok-keyword");
//! ```
//!
//! # Module Description
//!
//! - [`storage`] - Piece-table text storage with immutable snapshots
//! - [`line_index`] - Incremental line-start offset table
//! - [`delta`] - Edit descriptors shared by the ledger and workers
//! - [`ledger`] - Stale-coordinate remapping across un-analyzed edits
//! - [`spatial`] - Chunked spatial index over highlight spans
//! - [`style`] - Scope and severity tags with style-class resolution
//! - [`compositor`] - Per-line segment composition and caches
//! - [`folds`] - Fold ranges and their adjustment across edits
//! - [`history`] - Undo/redo with typing-run coalescing
//! - [`analysis`] - Worker contract and debounced scheduling
//! - [`session`] - The document session tying it all together
//!
//! # Unicode Support
//!
//! - UTF-8 internal encoding, character-offset coordinates throughout
//! - Grapheme-cluster cursor movement (Emoji combinations)

pub mod analysis;
pub mod compositor;
pub mod delta;
pub mod folds;
pub mod history;
pub mod ledger;
pub mod line_index;
pub mod session;
pub mod spatial;
pub mod storage;
pub mod style;

pub use analysis::{
    AnalysisBatch, AnalysisScheduler, AnalysisWorker, BracketMarker, DEFAULT_DEBOUNCE,
    ErrorMarker, RequestId,
};
pub use compositor::{LineCompositor, LineSegment, compose_segments};
pub use delta::EditDescriptor;
pub use folds::{FoldKind, FoldRange, FoldSet};
pub use history::{History, HistoryEntry, MergeMode};
pub use ledger::{EditLedger, EditOffset};
pub use line_index::{LineIndex, Position, Selection};
pub use session::DocumentSession;
pub use spatial::{CHUNK_SIZE, HighlightSpan, SpanIndex};
pub use storage::BufferSnapshot;
pub use style::{Scope, Severity};

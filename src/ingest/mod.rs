//! The reconciliation and chunking pipeline.
//!
//! * [`chunk`] — pure paragraph-boundary chunking of exported text.
//! * [`annotate`] — embedding annotation, pass-through when unconfigured.
//! * [`walker`] — iterative subtree walk with idempotent metadata upserts.
//! * [`processor`] — change-notification routing and batch handling.

pub mod annotate;
pub mod chunk;
pub mod processor;
pub mod walker;

pub use annotate::Annotator;
pub use chunk::{DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP_TOKENS, TextChunk, chunk_text};
pub use processor::{BatchReport, Processor};
pub use walker::{Reconciler, WalkStats};

//! Fuzzy unified-diff engine for mutation testing.
//!
//! This crate parses unified diffs produced by an LLM generator and applies
//! them to source text even when the declared `@@` line numbers are wrong or
//! the context lines have drifted from the real source.
//!
//! # Architecture
//!
//! This is an infrastructure crate:
//! - Depends on: `similar` (similarity scoring), `regex`
//! - Used by: `faultline-mutants` (mutation span isolation)
//!
//! The main pipeline is three pure stages over immutable [`Hunk`] values:
//!
//! 1. [`locate_hunks`] splits the diff into hunks and re-anchors each one to
//!    its true source range by content search when the header numbers cannot
//!    be trusted.
//! 2. [`reconcile`] revalidates every context line against the source and
//!    downgrades the ones the source does not contain to insertions.
//! 3. [`apply`] replays the hunks in ascending source order, tracking the
//!    cumulative line drift earlier hunks produce.
//!
//! [`apply_stream`] is the older single-pass fast path: it replays a raw diff
//! against a forward cursor without anchor search, synchronizing on context
//! lines instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use faultline_udiff::{apply, locate_hunks, reconcile};
//!
//! let hunks = locate_hunks(&source, &diff);
//! let hunks = reconcile(&source, &hunks);
//! let mutated = apply(&source, &hunks)?;
//! ```

mod applier;
mod error;
mod parser;
mod reconcile;
mod similarity;
mod stream;

pub use applier::{apply, apply_hunk, patch_file};
pub use error::{PatchError, Result};
pub use parser::{locate_hunks, DiffLine, Hunk};
pub use reconcile::reconcile;
pub use stream::apply_stream;

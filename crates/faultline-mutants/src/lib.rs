//! Mutation-span isolation for LLM-generated diffs.
//!
//! A generated diff may carry several candidate mutations, each delimited by
//! a `// MUTANT <START>` / `// MUTANT <END>` comment pair on insertion
//! lines. This crate rewrites such diffs so that a single mutation is live
//! at a time:
//!
//! - [`collapse_mutations`] walks located hunks and keeps only the changes
//!   inside open spans, reverting everything else to context.
//! - [`partition_mutations`] splits a multi-span diff into independent
//!   single-span diffs, each of which can be fed back through the
//!   `faultline-udiff` locate → reconcile → collapse → apply pipeline.
//!
//! # Architecture
//!
//! - Depends on: `faultline-udiff` (hunk model)
//! - Used by: the mutation workflow around the LLM generator
//!
//! The two entry points tolerate unbalanced markers differently on purpose:
//! the generator cannot be trusted to close every span, so the partitioner
//! terminates a span at the next END, the next START, or end-of-text,
//! whichever comes first, while the collapse path treats a START inside an
//! open span as a hard error.

mod collapse;
mod error;
mod markers;
mod partition;

pub use collapse::collapse_mutations;
pub use error::{MutantError, Result};
pub use markers::{MUTANT_END, MUTANT_SKIP, MUTANT_START};
pub use partition::partition_mutations;

// Re-exported so workflow code can consume hunks without a direct
// faultline-udiff dependency.
pub use faultline_udiff::{DiffLine, Hunk};

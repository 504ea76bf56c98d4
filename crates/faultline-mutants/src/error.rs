//! Error types for mutation-span handling.

use thiserror::Error;

/// Errors raised while isolating mutation spans.
#[derive(Debug, Error)]
pub enum MutantError {
    /// A START marker opened while a previous span was still open.
    #[error("overlapping mutation span opened by {marker:?}")]
    OverlappingSpan { marker: String },
}

/// Result type for mutation-span operations.
pub type Result<T> = std::result::Result<T, MutantError>;

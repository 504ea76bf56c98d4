//! Error types for patch application.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a patch application.
///
/// Content-level mismatches are deliberately not represented here: a drifted
/// context or deletion line is logged and recovered from, because the diffs
/// come from an approximate generator. Only structural violations are fatal.
#[derive(Debug, Error)]
pub enum PatchError {
    /// A hunk's resolved range falls outside the source file.
    #[error("hunk range {start}-{end} is out of bounds for a {len}-line source")]
    RangeOutOfBounds { start: i64, end: i64, len: usize },

    /// The source ran out of lines while a hunk still expected one.
    #[error("source exhausted after line {line} while applying a hunk")]
    SourceExhausted { line: usize },

    /// Reading the source file failed.
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for patch operations.
pub type Result<T> = std::result::Result<T, PatchError>;

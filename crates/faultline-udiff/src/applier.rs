//! Hunk application with cumulative line-offset tracking.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{PatchError, Result};
use crate::parser::{locate_hunks, DiffLine, Hunk};
use crate::reconcile::reconcile;
use crate::similarity::content_matches;

/// Apply hunks to source text in ascending source order.
///
/// Later hunks are shifted by the line delta earlier ones actually produced;
/// the delta is measured from the text, never taken from diff headers. An
/// empty hunk list returns the source unchanged.
pub fn apply(source: &str, hunks: &[Hunk]) -> Result<String> {
    let mut sorted: Vec<&Hunk> = hunks.iter().collect();
    sorted.sort_by_key(|h| h.start_line());

    let mut text = source.to_string();
    let mut offset: i64 = 0;
    for hunk in sorted {
        let lines_before = text.split('\n').count() as i64;
        text = apply_hunk_at(&text, hunk, offset)?;
        let lines_after = text.split('\n').count() as i64;
        offset += lines_after - lines_before;
    }
    Ok(text)
}

/// Apply a single hunk at its claimed position.
pub fn apply_hunk(source: &str, hunk: &Hunk) -> Result<String> {
    apply_hunk_at(source, hunk, 0)
}

/// Read a source file and run the full locate → reconcile → apply pipeline.
///
/// This is the engine's only I/O; writing the result anywhere is the
/// caller's job.
pub fn patch_file(path: &Path, diff: &str) -> Result<String> {
    let source = fs::read_to_string(path).map_err(|e| PatchError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let hunks = locate_hunks(&source, diff);
    let hunks = reconcile(&source, &hunks);
    apply(&source, &hunks)
}

fn apply_hunk_at(source: &str, hunk: &Hunk, offset: i64) -> Result<String> {
    let source_lines: Vec<&str> = source.split('\n').collect();

    let start = hunk.start_line() as i64 + offset;
    let end = hunk.end_line() as i64 + offset;
    if start < 1 || end > source_lines.len() as i64 {
        return Err(PatchError::RangeOutOfBounds {
            start,
            end,
            len: source_lines.len(),
        });
    }
    let start = start as usize;

    let mut result: Vec<&str> = Vec::with_capacity(source_lines.len());
    result.extend(&source_lines[..start - 1]);

    // 0-based index of the next source line the hunk consumes.
    let mut cursor = start - 1;
    for line in hunk.lines() {
        match line {
            DiffLine::Context(payload) => {
                let Some(source_line) = source_lines.get(cursor) else {
                    return Err(PatchError::SourceExhausted { line: cursor });
                };
                if !content_matches(source_line, payload) {
                    warn!(
                        "context mismatch at line {}: {source_line:?} != {payload:?}",
                        cursor + 1
                    );
                }
                result.push(source_line);
                cursor += 1;
            }
            DiffLine::Delete(payload) => {
                let Some(source_line) = source_lines.get(cursor) else {
                    return Err(PatchError::SourceExhausted { line: cursor });
                };
                if !content_matches(source_line, payload) {
                    warn!(
                        "deletion mismatch at line {}: {source_line:?} != {payload:?}",
                        cursor + 1
                    );
                }
                cursor += 1;
            }
            DiffLine::Insert(payload) => result.push(payload),
        }
    }
    result.extend(&source_lines[cursor..]);

    Ok(result.join("\n"))
}

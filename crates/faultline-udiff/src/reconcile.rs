//! Context revalidation for located hunks.
//!
//! Anchors are recovered by fuzzy search, so a hunk can carry context lines
//! that do not exist in the region it landed on. Left alone they would make
//! the applier consume the wrong source line; they are reclassified as
//! insertions before application.

use tracing::debug;

use crate::parser::{DiffLine, Hunk};
use crate::similarity::lines_match;

/// Revalidate the context lines of every hunk against the source.
///
/// Returns new hunks with the same ranges. Context lines that match the
/// source at their position (trimmed equality, containment, or high
/// similarity) are kept; the rest become insertions. Deletions advance the
/// source cursor without validation here, the applier checks them.
pub fn reconcile(source: &str, hunks: &[Hunk]) -> Vec<Hunk> {
    let source_lines: Vec<&str> = source.split('\n').collect();
    hunks
        .iter()
        .map(|hunk| reconcile_hunk(&source_lines, hunk))
        .collect()
}

fn reconcile_hunk(source_lines: &[&str], hunk: &Hunk) -> Hunk {
    let start = hunk.start_line();
    let end = hunk.end_line().min(source_lines.len());
    let segment: &[&str] = if start >= 1 && start <= end {
        &source_lines[start - 1..end]
    } else {
        &[]
    };

    let mut cursor = 0usize;
    let mut lines = Vec::with_capacity(hunk.lines().len());
    for line in hunk.lines() {
        match line {
            DiffLine::Context(payload) => {
                if cursor < segment.len() && lines_match(segment[cursor], payload) {
                    lines.push(line.clone());
                    cursor += 1;
                } else {
                    debug!(
                        "context line {payload:?} not found at source line {}, \
                         treating as insertion",
                        start + cursor
                    );
                    lines.push(DiffLine::Insert(payload.clone()));
                }
            }
            DiffLine::Delete(_) => {
                lines.push(line.clone());
                cursor += 1;
            }
            DiffLine::Insert(_) => lines.push(line.clone()),
        }
    }

    Hunk::new(lines, hunk.start_line(), hunk.end_line())
}

//! Collapse a marker-carrying patch so only open spans stay live.

use faultline_udiff::{DiffLine, Hunk};
use tracing::debug;

use crate::error::{MutantError, Result};
use crate::markers::{marker_kind, MarkerKind};

/// Rewrite hunks so that only changes inside MUTANT spans survive.
///
/// The "inside span" flag carries across hunk boundaries: a span opened in
/// one hunk may close in a later one, and an unclosed span simply runs to the
/// end of the patch. Outside a span, deletions revert to context lines and
/// insertions are dropped, so the surrounding code stays untouched.
/// Marker-free input is returned unchanged. Opening a span inside an open
/// span is an overlap and fails the whole call.
pub fn collapse_mutations(hunks: &[Hunk]) -> Result<Vec<Hunk>> {
    if !hunks.iter().any(has_marker) {
        return Ok(hunks.to_vec());
    }

    let mut collapsed = Vec::with_capacity(hunks.len());
    let mut in_span = false;
    for hunk in hunks {
        let (rewritten, next) = collapse_hunk(hunk, in_span)?;
        in_span = next;
        collapsed.push(rewritten);
    }
    if in_span {
        debug!("mutation span still open at end of patch");
    }

    Ok(collapsed)
}

fn has_marker(hunk: &Hunk) -> bool {
    hunk.lines()
        .iter()
        .any(|l| matches!(l, DiffLine::Insert(p) if marker_kind(p).is_some()))
}

/// Collapse one hunk, returning the rewritten hunk and the span state to
/// carry into the next one.
fn collapse_hunk(hunk: &Hunk, mut in_span: bool) -> Result<(Hunk, bool)> {
    let mut lines = Vec::with_capacity(hunk.lines().len());

    for line in hunk.lines() {
        match line {
            DiffLine::Insert(payload) => match marker_kind(payload) {
                Some(MarkerKind::Start) => {
                    if in_span {
                        return Err(MutantError::OverlappingSpan {
                            marker: payload.trim().to_string(),
                        });
                    }
                    in_span = true;
                }
                Some(MarkerKind::End) => in_span = false,
                Some(MarkerKind::Skip) => {}
                None => {
                    if in_span {
                        lines.push(line.clone());
                    }
                }
            },
            DiffLine::Delete(payload) => {
                if in_span {
                    lines.push(line.clone());
                } else {
                    // Revert: the deleted line stays in place as context.
                    lines.push(DiffLine::Context(payload.clone()));
                }
            }
            DiffLine::Context(_) => lines.push(line.clone()),
        }
    }

    Ok((Hunk::new(lines, hunk.start_line(), hunk.end_line()), in_span))
}

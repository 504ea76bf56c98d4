//! Split a multi-span diff into independent single-span diffs.

use tracing::debug;

use crate::error::{MutantError, Result};
use crate::markers::{marker_kind, neutralize, MarkerKind, MUTANT_END};

/// One live span inside the diff, as inclusive line indices.
struct Span {
    start: usize,
    end: usize,
    /// The span was cut off by a following START, so the emitted diff needs
    /// a synthesized END after it.
    synthesize_end: bool,
}

/// Split raw diff text into one diff per MUTANT span.
///
/// START and END counts need not balance: a span runs from its START to the
/// next END, the next START, or the end of the text, whichever comes first
/// (an END wins when it is strictly closer). Each emitted diff keeps its own
/// span verbatim and rewrites every other marker line to `MUTANT <SKIP>`, so
/// the diffs stay line-for-line parallel to the input and can be fed back
/// through the locate → collapse → apply pipeline independently.
///
/// A diff without START markers partitions into nothing.
pub fn partition_mutations(diff: &str) -> Result<Vec<String>> {
    let lines: Vec<&str> = diff.split('\n').collect();

    let starts: Vec<usize> = marker_positions(&lines, MarkerKind::Start);
    let ends: Vec<usize> = marker_positions(&lines, MarkerKind::End);
    if starts.is_empty() {
        return Ok(Vec::new());
    }

    let mut spans = Vec::with_capacity(starts.len());
    for (idx, &start) in starts.iter().enumerate() {
        let next_start = starts.get(idx + 1).copied();
        let next_end = ends.iter().copied().find(|&e| e > start);

        let span = match (next_end, next_start) {
            // Prefer the END when it is strictly closer than the next START.
            (Some(e), Some(s)) if e < s => Span {
                start,
                end: e,
                synthesize_end: false,
            },
            (Some(e), None) => Span {
                start,
                end: e,
                synthesize_end: false,
            },
            (_, Some(s)) => Span {
                start,
                end: s - 1,
                synthesize_end: true,
            },
            (None, None) => Span {
                start,
                end: lines.len() - 1,
                synthesize_end: false,
            },
        };
        spans.push(span);
    }

    // Marker layouts that defeat terminator precedence are beyond repair.
    for pair in spans.windows(2) {
        if pair[1].start <= pair[0].end {
            return Err(MutantError::OverlappingSpan {
                marker: lines[pair[1].start].trim().to_string(),
            });
        }
    }

    debug!("partitioning diff into {} single-span diffs", spans.len());
    Ok(spans.iter().map(|span| emit(&lines, span)).collect())
}

fn marker_positions(lines: &[&str], kind: MarkerKind) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| marker_kind(line) == Some(kind))
        .map(|(i, _)| i)
        .collect()
}

/// Render the diff in which only `span` is live.
fn emit(lines: &[&str], span: &Span) -> String {
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 1);

    for (i, line) in lines.iter().enumerate() {
        if i >= span.start && i <= span.end {
            out.push((*line).to_string());
        } else {
            out.push(neutralize(line));
        }
        if i == span.end && span.synthesize_end {
            out.push(format!("+{MUTANT_END}"));
        }
    }

    out.join("\n")
}

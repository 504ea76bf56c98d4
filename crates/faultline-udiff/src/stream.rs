//! Single-pass streaming applier.
//!
//! Predates the hunk pipeline and survives as the fast path for diffs whose
//! hunks are already in source order: the diff is replayed directly against a
//! forward cursor, synchronizing on context lines instead of anchor search.

use crate::error::{PatchError, Result};

/// Minimum trimmed payload length before a context match locks the cursor.
const CONFIDENCE_MIN_LEN: usize = 5;

/// Forward-scan state carried across the lines of one hunk.
///
/// Once a context line has matched near-exactly, later deletions in the same
/// hunk are consumed positionally instead of re-searched. The state resets at
/// every hunk header.
#[derive(Debug, Clone, Copy, Default)]
struct ScanState {
    confident: bool,
}

/// Apply a raw diff to source text in one forward pass.
///
/// Context lines synchronize the cursor: source lines are copied through
/// until one matches. Deletions consume the current line when the scan is
/// confident, and search forward for their payload otherwise. Running out of
/// source mid-scan is fatal.
pub fn apply_stream(source: &str, diff: &str) -> Result<String> {
    let source_lines: Vec<&str> = source.split('\n').collect();
    let mut cursor = 0usize;
    let mut output: Vec<&str> = Vec::with_capacity(source_lines.len());
    let mut state = ScanState::default();

    for raw in diff.split('\n') {
        if raw.starts_with("@@") {
            state = ScanState::default();
            continue;
        }
        if raw.trim().is_empty() || raw.starts_with("---") || raw.starts_with("+++") {
            continue;
        }

        let (marker, payload) = match raw.as_bytes()[0] {
            b'+' => ('+', raw[1..].trim_end()),
            b'-' => ('-', raw[1..].trim_end()),
            b' ' => (' ', raw[1..].trim_end()),
            // Unmarked lines synchronize as context of themselves.
            _ => (' ', raw.trim_end()),
        };

        match marker {
            '+' => output.push(payload),
            '-' => {
                if state.confident {
                    next_line(&source_lines, cursor)?;
                    cursor += 1;
                } else {
                    // Not yet synchronized: discard source lines until the
                    // deleted line is found.
                    loop {
                        let line = next_line(&source_lines, cursor)?;
                        cursor += 1;
                        if line.trim().starts_with(payload.trim()) {
                            break;
                        }
                    }
                }
            }
            _ => loop {
                let line = next_line(&source_lines, cursor)?;
                cursor += 1;
                output.push(line);
                if line.trim().starts_with(payload.trim()) {
                    if payload.trim().len() >= CONFIDENCE_MIN_LEN {
                        state.confident = true;
                    }
                    break;
                }
            },
        }
    }
    output.extend(&source_lines[cursor..]);

    Ok(output.join("\n"))
}

fn next_line<'a>(lines: &[&'a str], cursor: usize) -> Result<&'a str> {
    lines
        .get(cursor)
        .copied()
        .ok_or(PatchError::SourceExhausted { line: cursor })
}

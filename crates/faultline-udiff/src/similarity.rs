//! Line and sequence similarity helpers shared by the locator, reconciler
//! and applier.

use similar::TextDiff;

/// Minimum similarity for a context line to count as matching the source.
const LINE_MATCH_THRESHOLD: f32 = 0.85;

/// Minimum trimmed length before substring containment counts as a match;
/// shorter payloads match too many unrelated lines.
const CONTAINMENT_MIN_LEN: usize = 5;

/// Character-level similarity ratio between two strings (0.0..=1.0).
pub(crate) fn char_ratio(left: &str, right: &str) -> f32 {
    TextDiff::from_chars(left, right).ratio()
}

/// Similarity ratio between two line sequences, compared whitespace-trimmed.
pub(crate) fn sequence_ratio<L, R>(left: &[L], right: &[R]) -> f32
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    let left: Vec<&str> = left.iter().map(|l| l.as_ref().trim()).collect();
    let right: Vec<&str> = right.iter().map(|l| l.as_ref().trim()).collect();
    char_ratio(&left.join("\n"), &right.join("\n"))
}

/// Whether a diff context line matches a source line closely enough to keep.
///
/// Accepts trimmed equality, substring containment (a comment may have been
/// appended on either side since the generator saw the code), or a high
/// character-level similarity.
pub(crate) fn lines_match(source_line: &str, payload: &str) -> bool {
    let source = source_line.trim();
    let payload = payload.trim();

    if source == payload {
        return true;
    }

    if source.len() >= CONTAINMENT_MIN_LEN
        && payload.len() >= CONTAINMENT_MIN_LEN
        && (source.contains(payload) || payload.contains(source))
    {
        return true;
    }

    char_ratio(source, payload) >= LINE_MATCH_THRESHOLD
}

/// Whitespace-insensitive equality, used to decide whether a context or
/// deletion line has drifted enough to warn about.
pub(crate) fn content_matches(left: &str, right: &str) -> bool {
    let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    strip(left) == strip(right)
}

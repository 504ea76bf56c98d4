//! Mutation marker comments and their matchers.
//!
//! The generator is asked to delimit each candidate mutation with a
//! START/END comment pair carried on insertion lines. Matching is by
//! containment: the marker may be indented or trail other text, and the
//! comment leader may vary by target language.

use std::sync::LazyLock;

use regex::Regex;

/// Opens a mutation span.
pub const MUTANT_START: &str = "// MUTANT <START>";
/// Closes a mutation span.
pub const MUTANT_END: &str = "// MUTANT <END>";
/// Neutralized marker emitted by the partitioner; no downstream effect.
pub const MUTANT_SKIP: &str = "// MUTANT <SKIP>";

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"MUTANT <(START|END|SKIP)>").expect("invalid marker regex"));

/// The kind of marker a line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkerKind {
    Start,
    End,
    Skip,
}

/// Which marker, if any, a line or payload carries.
pub(crate) fn marker_kind(text: &str) -> Option<MarkerKind> {
    MARKER.captures(text).map(|caps| match &caps[1] {
        "START" => MarkerKind::Start,
        "END" => MarkerKind::End,
        _ => MarkerKind::Skip,
    })
}

/// Rewrite START/END markers in a line to the neutral SKIP form.
pub(crate) fn neutralize(line: &str) -> String {
    line.replace("MUTANT <START>", "MUTANT <SKIP>")
        .replace("MUTANT <END>", "MUTANT <SKIP>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_kind_detects_indented_markers() {
        assert_eq!(marker_kind("    // MUTANT <START>"), Some(MarkerKind::Start));
        assert_eq!(marker_kind("// MUTANT <END>"), Some(MarkerKind::End));
        assert_eq!(marker_kind("# MUTANT <SKIP>"), Some(MarkerKind::Skip));
        assert_eq!(marker_kind("    return x"), None);
    }

    #[test]
    fn test_neutralize_rewrites_both_markers() {
        assert_eq!(neutralize("+// MUTANT <START>"), "+// MUTANT <SKIP>");
        assert_eq!(neutralize("+  // MUTANT <END>"), "+  // MUTANT <SKIP>");
        assert_eq!(neutralize(" unrelated"), " unrelated");
    }
}

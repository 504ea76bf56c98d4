//! Unified diff parsing and hunk anchor recovery.
//!
//! LLM-generated diffs routinely carry wrong `@@` line numbers, so every
//! hunk's claimed position is verified against the real source and recovered
//! by content search when the numbers cannot be trusted.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::similarity::sequence_ratio;

/// Hunk header of the form `@@ -start,len +start,len @@`; the length parts
/// are optional, some emitters drop them for single-line ranges.
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+\d+(?:,\d+)? @@").expect("invalid hunk header regex")
});

/// Minimum sequence similarity for declared hunk numbers to be trusted.
const RELIABLE_RATIO: f32 = 0.8;

/// Score bonus for an anchor candidate whose last line is confirmed.
const LAST_LINE_BONUS: f32 = 0.2;

/// How many lines past the hunk's own length the anchor probe may extend.
const PROBE_EXTRA_LINES: usize = 4;

/// One line of a hunk body, tagged with its diff marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Unchanged line, present for positioning only.
    Context(String),
    /// Line the diff adds.
    Insert(String),
    /// Line the diff removes from the source.
    Delete(String),
}

impl DiffLine {
    /// The line payload without its marker character.
    pub fn payload(&self) -> &str {
        match self {
            DiffLine::Context(s) | DiffLine::Insert(s) | DiffLine::Delete(s) => s,
        }
    }

    /// True for context and delete lines, which mirror the original source.
    pub fn is_original(&self) -> bool {
        matches!(self, DiffLine::Context(_) | DiffLine::Delete(_))
    }
}

/// A contiguous diff block anchored to an inclusive 1-based source range.
///
/// Immutable once built: the locator is the only producer, and downstream
/// stages derive new hunks instead of mutating existing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    lines: Vec<DiffLine>,
    start_line: usize,
    end_line: usize,
}

impl Hunk {
    pub fn new(lines: Vec<DiffLine>, start_line: usize, end_line: usize) -> Self {
        Self {
            lines,
            start_line,
            end_line,
        }
    }

    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    /// First source line (1-based) this hunk claims to cover.
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Last source line (inclusive) this hunk claims to cover.
    pub fn end_line(&self) -> usize {
        self.end_line
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lines {}-{}", self.start_line, self.end_line)
    }
}

/// Split a raw diff into hunks anchored to verified source positions.
///
/// Returns an empty vector when no hunk header is found; absence of hunks is
/// a valid no-op, not an error. Text before the first header (LLM prose,
/// code fences) is ignored.
pub fn locate_hunks(source: &str, diff: &str) -> Vec<Hunk> {
    let source_lines: Vec<&str> = source.split('\n').collect();

    let mut hunks = Vec::new();
    let mut header: Option<&str> = None;
    let mut body: Vec<DiffLine> = Vec::new();

    for line in diff.split('\n') {
        if line.starts_with("@@") {
            if let Some(h) = header {
                if !body.is_empty() {
                    hunks.push(build_hunk(&source_lines, h, std::mem::take(&mut body)));
                }
            }
            header = Some(line);
            body.clear();
        } else if header.is_some() {
            if let Some(parsed) = parse_body_line(line) {
                body.push(parsed);
            }
        }
    }
    if let Some(h) = header {
        if !body.is_empty() {
            hunks.push(build_hunk(&source_lines, h, body));
        }
    }

    hunks
}

/// Classify one hunk body line, or drop it.
///
/// Empty lines are treated as absent: editors strip trailing whitespace from
/// empty context lines, and nothing downstream ever acts on them.
fn parse_body_line(line: &str) -> Option<DiffLine> {
    if line.is_empty() {
        return None;
    }
    if line.starts_with("---") || line.starts_with("+++") || line.starts_with('\\') {
        return None;
    }
    match line.as_bytes()[0] {
        b'+' => Some(DiffLine::Insert(line[1..].to_string())),
        b'-' => Some(DiffLine::Delete(line[1..].to_string())),
        b' ' => Some(DiffLine::Context(line[1..].to_string())),
        _ => {
            debug!("dropping unmarked diff line: {line:?}");
            None
        }
    }
}

fn build_hunk(source_lines: &[&str], header: &str, lines: Vec<DiffLine>) -> Hunk {
    let originals: Vec<&str> = lines
        .iter()
        .filter(|l| l.is_original())
        .map(DiffLine::payload)
        .collect();

    let (declared_start, declared_len) = match HUNK_HEADER.captures(header) {
        Some(caps) => {
            let start = caps[1].parse().unwrap_or(1);
            let len = caps
                .get(2)
                .map(|m| m.as_str().parse().unwrap_or(1))
                .unwrap_or(1);
            (start, len)
        }
        None => {
            debug!("unparsable hunk header {header:?}, guessing from hunk body");
            (1, originals.len())
        }
    };

    let (start, len) = verify_anchor(source_lines, &originals, declared_start, declared_len);
    Hunk::new(lines, start, start + len.max(1) - 1)
}

/// Check a hunk's declared position against the source, recovering the real
/// anchor when the numbers cannot be trusted.
///
/// An unrecoverable anchor degrades to a default guess rather than an error;
/// content-mismatch warnings during application are the only later signal.
fn verify_anchor(
    source_lines: &[&str],
    originals: &[&str],
    declared_start: usize,
    declared_len: usize,
) -> (usize, usize) {
    if originals.is_empty() {
        // Pure insertion: nothing to match against, keep in-bounds numbers.
        if declared_start >= 1 && declared_start <= source_lines.len() {
            return (declared_start, declared_len);
        }
        return (1, 0);
    }

    if declared_start >= 1 && declared_start <= source_lines.len() {
        let end = (declared_start - 1 + declared_len).min(source_lines.len());
        let expected = &source_lines[declared_start - 1..end];
        if anchor_is_reliable(originals, expected) {
            return (declared_start, declared_len);
        }
    }

    best_match_position(source_lines, originals)
}

/// Declared numbers are trusted only when the hunk's first and last original
/// lines both land where the header says and the region as a whole is close.
fn anchor_is_reliable(originals: &[&str], expected: &[&str]) -> bool {
    if expected.is_empty() || originals.len() > expected.len() {
        return false;
    }

    let first_matches = originals[0].trim() == expected[0].trim();
    let last_matches = originals[originals.len() - 1].trim() == expected[originals.len() - 1].trim();

    first_matches
        && last_matches
        && sequence_ratio(originals, &expected[..originals.len()]) > RELIABLE_RATIO
}

/// Search the whole source for the range the hunk really describes.
fn best_match_position(source_lines: &[&str], originals: &[&str]) -> (usize, usize) {
    let first = originals[0].trim();
    let last = originals[originals.len() - 1].trim();

    let candidates: Vec<usize> = source_lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim() == first)
        .map(|(i, _)| i + 1)
        .collect();

    if candidates.is_empty() {
        return sliding_scan(source_lines, originals);
    }

    let mut best_score = f32::MIN;
    let mut best = (candidates[0], originals.len());
    for pos in candidates {
        // Probe a few lengths past the hunk's own span; the generator may
        // have dropped blank or duplicated lines from the region.
        let mut confirmed_len = None;
        for len in originals.len()..=originals.len() + PROBE_EXTRA_LINES {
            if pos + len - 1 > source_lines.len() {
                break;
            }
            if source_lines[pos + len - 2].trim() == last {
                confirmed_len = Some(len);
                break;
            }
        }

        let len = confirmed_len.unwrap_or(originals.len());
        let end = (pos - 1 + len).min(source_lines.len());
        let mut score = sequence_ratio(originals, &source_lines[pos - 1..end]);
        if confirmed_len.is_some() {
            score += LAST_LINE_BONUS;
        }
        if score > best_score {
            best_score = score;
            best = (pos, len);
        }
    }

    debug!(
        "re-anchored hunk to line {} (score {:.2})",
        best.0, best_score
    );
    best
}

/// Last resort: slide a window of the hunk's length over the whole source
/// and take the most similar position.
fn sliding_scan(source_lines: &[&str], originals: &[&str]) -> (usize, usize) {
    let mut best_start = 1;
    let mut best_score = 0.0f32;

    for start in 1..=source_lines.len() {
        let end = (start - 1 + originals.len()).min(source_lines.len());
        let score = sequence_ratio(originals, &source_lines[start - 1..end]);
        if score > best_score {
            best_score = score;
            best_start = start;
        }
    }

    debug!("sliding-window anchor at line {best_start} (score {best_score:.2})");
    (best_start, originals.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(s: &str) -> DiffLine {
        DiffLine::Context(s.to_string())
    }

    fn ins(s: &str) -> DiffLine {
        DiffLine::Insert(s.to_string())
    }

    fn del(s: &str) -> DiffLine {
        DiffLine::Delete(s.to_string())
    }

    #[test]
    fn test_empty_diff_yields_no_hunks() {
        assert!(locate_hunks("print('test')\n", "").is_empty());
    }

    #[test]
    fn test_garbage_diff_yields_no_hunks() {
        assert!(locate_hunks("print('test')\n", "invalid diff content").is_empty());
    }

    #[test]
    fn test_basic_hunk() {
        let source = "def hello():\n    print(\"Hello\")\n    print(\"World\")\n";
        let diff = r#"--- a/test.py
+++ b/test.py
@@ -1,3 +1,3 @@
 def hello():
-    print("Hello")
+    print("Hello!!!")
     print("World")
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(
            hunks[0].lines(),
            &[
                ctx("def hello():"),
                del("    print(\"Hello\")"),
                ins("    print(\"Hello!!!\")"),
                ctx("    print(\"World\")"),
            ]
        );
        assert_eq!(hunks[0].start_line(), 1);
        assert_eq!(hunks[0].end_line(), 3);
    }

    #[test]
    fn test_multiple_hunks() {
        let source = "def function1():\n    print(\"Function 1\")\n\ndef function2():\n    print(\"Function 2\")\n\ndef function3():\n    print(\"Function 3\")\n";
        let diff = r#"--- a/test.py
+++ b/test.py
@@ -1,5 +1,6 @@
 def function1():
-    print("Function 1")
+    print("Modified Function 1")
+    return True

 def function2():
     print("Function 2")
@@ -7,3 +8,4 @@
 def function3():
-    print("Function 3")
+    print("Modified Function 3")
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].start_line(), 1);
        assert_eq!(hunks[0].end_line(), 5);
        assert_eq!(hunks[1].start_line(), 7);
        assert_eq!(hunks[1].end_line(), 9);
    }

    #[test]
    fn test_declared_numbers_trusted_when_reliable() {
        let source = "line1\nline2\nline3\nline4\nline5\n";
        let diff = r#"@@ -2,3 +2,3 @@
 line2
-line3
+modified line3
 line4
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].start_line(), 2);
        assert_eq!(hunks[0].end_line(), 4);
        assert_eq!(
            hunks[0].lines(),
            &[
                ctx("line2"),
                del("line3"),
                ins("modified line3"),
                ctx("line4"),
            ]
        );
    }

    #[test]
    fn test_wrong_header_recovered_by_search() {
        // The generator claimed line 10 in a 2-line file.
        let source = "def f():\n    return 1\n";
        let diff = r#"--- a/f.py
+++ b/f.py
@@ -10,2 +10,2 @@
 def f():
-    return 1
+    return 2
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].start_line(), 1);
        assert_eq!(hunks[0].end_line(), 2);
    }

    #[test]
    fn test_in_bounds_but_wrong_header_recovered() {
        let source =
            "def hello():\n    print(\"Hello\")\n    print(\"World\")\n    print(\"!\")\n";
        let diff = r#"@@ -3,3 +3,3 @@
 def hello():
-    print("Hello")
+    print("Hello!!!")
     print("World")
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].start_line(), 1);
        assert_eq!(hunks[0].end_line(), 3);
    }

    #[test]
    fn test_unparsable_header_defaults_and_recovers() {
        let source = "def hello():\n    print(\"Hello\")\n    print(\"World\")\n";
        let diff = r#"@@ ??? @@
 def hello():
-    print("Hello")
+    print("hi")
     print("World")
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].start_line(), 1);
        assert_eq!(hunks[0].end_line(), 3);
    }

    #[test]
    fn test_header_without_lengths() {
        let source = "alpha\nbeta\ngamma\n";
        let diff = "@@ -2 +2 @@\n-beta\n+BETA\n";

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].start_line(), 2);
        assert_eq!(hunks[0].end_line(), 2);
    }

    #[test]
    fn test_anchor_probe_extends_past_declared_length() {
        // The region really spans four lines; the generator dropped the
        // blank line and the declared start is nonsense.
        let source = "fn a() {\n\n    work();\n}\nfn b() {}\n";
        let diff = r#"@@ -40,2 +40,2 @@
 fn a() {
-}
+} // end
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].start_line(), 1);
        assert_eq!(hunks[0].end_line(), 4);
    }

    #[test]
    fn test_sliding_scan_when_first_line_never_matches() {
        let source = "alpha one\nbeta two\ngamma three\ndelta four\n";
        // No source line equals the first original line exactly, so the
        // anchor falls back to the most similar window.
        let diff = r#"@@ -99,2 +99,2 @@
 gamma threX
-delta fouX
+delta FIVE
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].start_line(), 3);
        assert_eq!(hunks[0].end_line(), 4);
    }

    #[test]
    fn test_prose_and_fences_around_diff_ignored() {
        let source = "line1\nline2\n";
        let diff = r#"Here is the diff you asked for:
```diff
--- a/x
+++ b/x
@@ -1,2 +1,2 @@
 line1
-line2
+line two
```
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        // The closing fence is junk, not part of the hunk body.
        assert_eq!(
            hunks[0].lines(),
            &[ctx("line1"), del("line2"), ins("line two")]
        );
    }

    #[test]
    fn test_empty_insertion_payload_kept() {
        let source = "def hello():\n    print(\"Hello\")\n    print(\"World\")\n";
        let diff = r#"@@ -1,3 +1,4 @@
 def hello():
     print("Hello")
+
     print("World")
"#;

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].lines()[2], ins(""));
        assert_eq!(hunks[0].start_line(), 1);
        assert_eq!(hunks[0].end_line(), 3);
    }

    #[test]
    fn test_no_trailing_newline() {
        let source = "def hello():\n    print(\"Hello\")\n    print(\"World\")";
        let diff = "--- a/test.py\n+++ b/test.py\n@@ -1,3 +1,3 @@\n def hello():\n     print(\"Hello\")\n-    print(\"World\")\n+    print(\"Goodbye\")";

        let hunks = locate_hunks(source, diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].start_line(), 1);
        assert_eq!(hunks[0].end_line(), 3);
        assert_eq!(hunks[0].lines().len(), 4);
    }

    #[test]
    fn test_display_reports_range() {
        let hunk = Hunk::new(vec![], 3, 7);
        assert_eq!(hunk.to_string(), "lines 3-7");
    }
}

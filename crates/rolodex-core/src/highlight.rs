//! Highlight projection: field text + match ranges → display segments.
//!
//! [`project`] splits a text into an ordered run of [`Segment`]s tagged
//! `plain` or `matched`. Concatenating the segment texts always gives back
//! the original text, so a renderer can escape `plain` segments and wrap
//! `matched` ones without scanning the text again.

use serde::Serialize;

use crate::fuzzy::MatchRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Plain,
    Matched,
}

/// A contiguous slice of a field's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Plain,
            text: text.into(),
        }
    }

    pub fn matched(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Matched,
            text: text.into(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.kind == SegmentKind::Matched
    }
}

/// Split `text` into plain and matched segments.
///
/// `ranges` are inclusive character positions, expected non-overlapping
/// and increasing. They are consumed in the given order; touching ranges
/// end up in a single matched segment. Positions past the end of the text
/// are clamped and a range starting before the end of the previous one is
/// trimmed, so every character lands in exactly one segment whatever the
/// input.
///
/// With no ranges the whole text is one plain segment.
pub fn project(text: &str, ranges: &[MatchRange]) -> Vec<Segment> {
    if ranges.is_empty() {
        return vec![Segment::plain(text)];
    }

    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = offsets.len() - 1;

    let mut segments = Vec::new();
    let mut cursor = 0;
    for range in ranges {
        let start = range.start.clamp(cursor, char_count);
        let end = range.end.saturating_add(1).min(char_count);
        if end <= start {
            continue;
        }
        push(&mut segments, SegmentKind::Plain, &text[offsets[cursor]..offsets[start]]);
        push(&mut segments, SegmentKind::Matched, &text[offsets[start]..offsets[end]]);
        cursor = end;
    }
    push(&mut segments, SegmentKind::Plain, &text[offsets[cursor]..]);

    if segments.is_empty() {
        segments.push(Segment::plain(text));
    }
    segments
}

/// Reassemble the original text from its segments.
pub fn concat(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

fn push(segments: &mut Vec<Segment>, kind: SegmentKind, slice: &str) {
    if slice.is_empty() {
        return;
    }
    if let Some(last) = segments.last_mut() {
        if last.kind == kind {
            last.text.push_str(slice);
            return;
        }
    }
    segments.push(Segment {
        kind,
        text: slice.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::{MatchOptions, Pattern};

    fn r(start: usize, end: usize) -> MatchRange {
        MatchRange::new(start, end)
    }

    #[test]
    fn test_no_ranges_is_single_plain() {
        assert_eq!(project("hello", &[]), vec![Segment::plain("hello")]);
        assert_eq!(project("", &[]), vec![Segment::plain("")]);
    }

    #[test]
    fn test_basic_projection() {
        let segments = project("met at a conference", &[r(9, 12), r(14, 18)]);
        assert_eq!(
            segments,
            vec![
                Segment::plain("met at a "),
                Segment::matched("conf"),
                Segment::plain("e"),
                Segment::matched("rence"),
            ]
        );
    }

    #[test]
    fn test_whole_text_match() {
        assert_eq!(project("gym", &[r(0, 2)]), vec![Segment::matched("gym")]);
    }

    #[test]
    fn test_touching_ranges_merge() {
        let segments = project("abcdef", &[r(1, 2), r(3, 4)]);
        assert_eq!(
            segments,
            vec![
                Segment::plain("a"),
                Segment::matched("bcde"),
                Segment::plain("f"),
            ]
        );
    }

    #[test]
    fn test_multibyte_text() {
        let segments = project("über café!", &[r(5, 8)]);
        assert_eq!(
            segments,
            vec![
                Segment::plain("über "),
                Segment::matched("café"),
                Segment::plain("!"),
            ]
        );
    }

    #[test]
    fn test_markup_characters_kept_verbatim() {
        let text = "<b>Tom & \"Jerry\"</b>";
        let segments = project(text, &[r(3, 5)]);
        assert_eq!(concat(&segments), text);
        assert_eq!(segments[1], Segment::matched("Tom"));
    }

    #[test]
    fn test_malformed_ranges_never_lose_text() {
        let text = "abcdef";
        for ranges in [
            vec![r(4, 100)],
            vec![r(10, 12)],
            vec![r(3, 4), r(1, 2)],
            vec![r(0, 3), r(2, 5)],
        ] {
            assert_eq!(concat(&project(text, &ranges)), text, "ranges: {:?}", ranges);
        }
    }

    #[test]
    fn test_coverage_over_matcher_output() {
        let texts = [
            "Alice Park",
            "met at a conference in Seattle",
            "über café",
            "Jordan's sister's café & bar",
        ];
        let queries = ["park", "confrence", "cafe", "jordn", "sister"];
        let opts = MatchOptions::default();

        for text in texts {
            for query in queries {
                if let Some(m) = Pattern::new(query).match_text(text, &opts) {
                    let segments = project(text, &m.ranges);
                    assert_eq!(concat(&segments), text, "query={query} text={text}");
                    assert!(segments.iter().any(Segment::is_matched));
                    for pair in segments.windows(2) {
                        assert_ne!(pair[0].kind, pair[1].kind);
                    }
                }
            }
        }
    }
}

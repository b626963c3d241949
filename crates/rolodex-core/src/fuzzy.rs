//! Approximate text matching with character-level match ranges.
//!
//! A [`Pattern`] is matched against a field text in two passes:
//!
//! 1. **Exact pass.** If the case-folded text equals the pattern the score
//!    is `0.0`. Otherwise every non-overlapping occurrence of the pattern is
//!    collected; any occurrence gives the score floor ([`SCORE_FLOOR`]).
//! 2. **Approximate pass.** Sellers' variant of the optimal string
//!    alignment distance: the pattern may start and end anywhere in the
//!    text, and substitutions, insertions, deletions and adjacent
//!    transpositions each cost one edit. The score is
//!    `edits / pattern_len`, rejected above [`MatchOptions::threshold`].
//!
//! Neither pass looks at where in the text the match sits, so a hit at the
//! end of a long note scores the same as one at the start.
//!
//! Ranges are inclusive `[start, end]` positions counted in `char`s of the
//! original text. Case folding maps each char to exactly one char so
//! positions in the folded text line up with the original.

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

/// Lowest score a non-identical match can have.
pub const SCORE_FLOOR: f64 = 0.001;

/// An inclusive range of character positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

impl MatchRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl Serialize for MatchRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.start)?;
        tuple.serialize_element(&self.end)?;
        tuple.end()
    }
}

/// Tuning knobs for a single match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Maximum `edits / pattern_len` accepted as a match.
    pub threshold: f64,
    /// Shortest run of matched characters that counts toward a hit.
    pub min_match_len: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.35,
            min_match_len: 2,
        }
    }
}

/// Result of matching one pattern against one text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    /// `0.0` for an identical text, otherwise in `[SCORE_FLOOR, threshold]`.
    pub score: f64,
    /// Non-overlapping, increasing ranges of matched characters.
    pub ranges: Vec<MatchRange>,
}

/// Case-fold a single character to one character.
pub fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Case-fold a text, preserving its character count.
pub fn fold(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

/// A case-folded query ready to be matched against many texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    chars: Vec<char>,
}

impl Pattern {
    pub fn new(query: &str) -> Self {
        Self {
            chars: fold(query.trim()),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Match against raw text.
    pub fn match_text(&self, text: &str, opts: &MatchOptions) -> Option<TextMatch> {
        self.match_folded(&fold(text), opts)
    }

    /// Match against text already folded with [`fold`].
    pub fn match_folded(&self, text: &[char], opts: &MatchOptions) -> Option<TextMatch> {
        let m = self.chars.len();
        if m == 0 || text.is_empty() || m < opts.min_match_len.max(1) {
            return None;
        }

        if text == self.chars.as_slice() {
            return Some(TextMatch {
                score: 0.0,
                ranges: vec![MatchRange::new(0, text.len() - 1)],
            });
        }

        let exact = find_exact(text, &self.chars);
        if !exact.is_empty() {
            return Some(TextMatch {
                score: SCORE_FLOOR,
                ranges: exact
                    .into_iter()
                    .map(|start| MatchRange::new(start, start + m - 1))
                    .collect(),
            });
        }

        self.match_approximate(text, opts)
    }

    fn match_approximate(&self, text: &[char], opts: &MatchOptions) -> Option<TextMatch> {
        let p = &self.chars;
        let m = p.len();
        let (best_end, edits) = locate(p, text, opts.threshold)?;

        let score = edits as f64 / m as f64;
        if score > opts.threshold {
            return None;
        }

        // Only the tail of the text that the best alignment can reach is
        // traced, so the full table stays O(m * (m + edits)).
        let start = window_start(best_end, m, edits);
        let window = &text[start..best_end];
        let table = Alignment::compute(p, window);
        let mut marked = vec![false; text.len()];
        for (offset, on) in table.trace(p, window, window.len()).into_iter().enumerate() {
            marked[start + offset] = on;
        }

        let ranges = runs(&marked, opts.min_match_len);
        if ranges.is_empty() {
            return None;
        }

        Some(TextMatch {
            score: score.max(SCORE_FLOOR),
            ranges,
        })
    }
}

/// Largest edit count whose score stays within `threshold`.
fn max_edits(m: usize, threshold: f64) -> usize {
    let mut k = (threshold * m as f64).floor() as usize;
    while k < m && (k + 1) as f64 / m as f64 <= threshold {
        k += 1;
    }
    k
}

/// First text position a best alignment ending at `end` can start from.
///
/// Every aligned text char is a match, a substitution, half of a
/// transposition or an insertion, so at most `m + edits` chars are used.
fn window_start(end: usize, m: usize, edits: usize) -> usize {
    end.saturating_sub(m + edits)
}

/// Leftmost text end position with the fewest edits, as `(end, edits)`.
///
/// Keeps three rolling rows of the alignment table, so memory is linear in
/// the text. Stops early once two consecutive rows are both over the edit
/// budget, since later rows can only build on them.
fn locate(p: &[char], t: &[char], threshold: f64) -> Option<(usize, usize)> {
    let m = p.len();
    let n = t.len();
    let budget = max_edits(m, threshold);

    let mut before = vec![0usize; n + 1];
    let mut prev = vec![0usize; n + 1];
    let mut row = vec![0usize; n + 1];
    let mut prev_min = 0;

    for i in 1..=m {
        row[0] = i;
        let mut row_min = i;
        for j in 1..=n {
            let cost = usize::from(p[i - 1] != t[j - 1]);
            let mut best = (prev[j - 1] + cost).min(prev[j] + 1).min(row[j - 1] + 1);
            if is_transposition(p, t, i, j) {
                best = best.min(before[j - 2] + 1);
            }
            row[j] = best;
            row_min = row_min.min(best);
        }
        if row_min > budget && prev_min > budget {
            return None;
        }
        prev_min = row_min;
        std::mem::swap(&mut before, &mut prev);
        std::mem::swap(&mut prev, &mut row);
    }

    (1..=n)
        .map(|j| (j, prev[j]))
        .min_by_key(|&(j, d)| (d, j))
        .filter(|&(_, d)| d <= budget)
}

/// Non-overlapping exact occurrences of `pattern`, left to right.
fn find_exact(text: &[char], pattern: &[char]) -> Vec<usize> {
    let m = pattern.len();
    let mut starts = Vec::new();
    let mut i = 0;
    while i + m <= text.len() {
        if &text[i..i + m] == pattern {
            starts.push(i);
            i += m;
        } else {
            i += 1;
        }
    }
    starts
}

/// Collapse a per-character mask into ranges of at least `min_len` chars.
fn runs(marked: &[bool], min_len: usize) -> Vec<MatchRange> {
    let mut ranges = Vec::new();
    let mut start: Option<usize> = None;
    for (i, &on) in marked.iter().chain(std::iter::once(&false)).enumerate() {
        match (on, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_len {
                    ranges.push(MatchRange::new(s, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }
    ranges
}

/// Dynamic-programming table for pattern-in-text alignment.
///
/// `get(i, j)` is the fewest edits turning `pattern[..i]` into some
/// substring of `text` that ends at position `j`.
struct Alignment {
    cols: usize,
    cells: Vec<usize>,
}

impl Alignment {
    fn compute(p: &[char], t: &[char]) -> Self {
        let rows = p.len() + 1;
        let cols = t.len() + 1;
        let mut table = Self {
            cols,
            cells: vec![0; rows * cols],
        };

        for i in 1..rows {
            table.set(i, 0, i);
            for j in 1..cols {
                let cost = usize::from(p[i - 1] != t[j - 1]);
                let mut best = (table.get(i - 1, j - 1) + cost)
                    .min(table.get(i - 1, j) + 1)
                    .min(table.get(i, j - 1) + 1);
                if is_transposition(p, t, i, j) {
                    best = best.min(table.get(i - 2, j - 2) + 1);
                }
                table.set(i, j, best);
            }
        }
        table
    }

    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }

    fn set(&mut self, i: usize, j: usize, value: usize) {
        self.cells[i * self.cols + j] = value;
    }

    /// Walk back from `(pattern_len, end)` and mark the text characters
    /// that line up with pattern characters.
    fn trace(&self, p: &[char], t: &[char], end: usize) -> Vec<bool> {
        let mut marked = vec![false; t.len()];
        let (mut i, mut j) = (p.len(), end);

        while i > 0 {
            let here = self.get(i, j);
            if j > 0 && p[i - 1] == t[j - 1] && self.get(i - 1, j - 1) == here {
                marked[j - 1] = true;
                i -= 1;
                j -= 1;
            } else if is_transposition(p, t, i, j) && self.get(i - 2, j - 2) + 1 == here {
                marked[j - 1] = true;
                marked[j - 2] = true;
                i -= 2;
                j -= 2;
            } else if j > 0 && self.get(i - 1, j - 1) + 1 == here {
                i -= 1;
                j -= 1;
            } else if self.get(i - 1, j) + 1 == here {
                i -= 1;
            } else if j > 0 {
                j -= 1;
            } else {
                i -= 1;
            }
        }
        marked
    }
}

fn is_transposition(p: &[char], t: &[char], i: usize, j: usize) -> bool {
    i > 1 && j > 1 && p[i - 1] == t[j - 2] && p[i - 2] == t[j - 1] && p[i - 1] != p[i - 2]
}

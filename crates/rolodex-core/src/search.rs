//! Query engine: fuzzy search over an [`Index`].
//!
//! Every indexed value of every record is matched independently with the
//! approximate matcher in [`crate::fuzzy`]. A record is kept when at least
//! one value hits, and its aggregate score combines all of its hits.
//!
//! # Scoring
//!
//! For each hit value with match score `s` (0 = identical), normalized
//! field weight `w` and field-length norm `n`:
//!
//! ```text
//! aggregate = Π  max(s, ε) ^ (w × n)
//! ```
//!
//! Every factor is in `(0, 1]`, so more hits and heavier fields both push
//! the aggregate toward 0. Lower is better. Results are sorted ascending
//! with a stable sort, so equal scores keep collection order.

use serde::Serialize;

use crate::fields::Field;
use crate::fuzzy::{MatchOptions, MatchRange, Pattern};
use crate::index::{Index, IndexedRecord};

/// Query-time tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Maximum normalized edit distance accepted for a field hit.
    pub threshold: f64,
    /// Shortest run of matched characters that counts toward a hit.
    pub min_match_char_length: usize,
    /// Treat every field as if it had a single token.
    pub ignore_field_norm: bool,
    /// Truncate results after sorting.
    pub limit: Option<usize>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            threshold: 0.35,
            min_match_char_length: 2,
            ignore_field_norm: false,
            limit: None,
        }
    }
}

impl SearchParams {
    fn match_options(&self) -> MatchOptions {
        MatchOptions {
            threshold: self.threshold,
            min_match_len: self.min_match_char_length,
        }
    }
}

/// Matched ranges within one field value of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatch {
    pub field: Field,
    /// Element index for list-valued fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_index: Option<usize>,
    pub score: f64,
    pub ranges: Vec<MatchRange>,
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Position of the record in the collection the index was built from.
    pub position: usize,
    pub id: String,
    /// Aggregate score, lower is better.
    pub score: f64,
    pub matches: Vec<FieldMatch>,
}

impl MatchResult {
    /// Find the match for a field, or for one element of a list field.
    pub fn field_match(&self, field: Field, array_index: Option<usize>) -> Option<&FieldMatch> {
        self.matches
            .iter()
            .find(|m| m.field == field && m.array_index == array_index)
    }
}

/// Run a fuzzy search against an index.
///
/// An empty or whitespace-only query returns no results; callers show the
/// unfiltered collection instead.
pub fn search(index: &Index, query: &str, params: &SearchParams) -> Vec<MatchResult> {
    let pattern = Pattern::new(query);
    if pattern.is_empty() {
        return Vec::new();
    }

    let opts = params.match_options();
    let mut results: Vec<MatchResult> = index
        .records()
        .iter()
        .enumerate()
        .filter_map(|(position, record)| {
            score_record(position, record, &pattern, &opts, params.ignore_field_norm)
        })
        .collect();

    results.sort_by(|a, b| a.score.total_cmp(&b.score));

    if let Some(limit) = params.limit {
        results.truncate(limit);
    }

    tracing::debug!(
        query_len = pattern.len(),
        candidates = index.len(),
        hits = results.len(),
        "search complete"
    );
    results
}

fn score_record(
    position: usize,
    record: &IndexedRecord,
    pattern: &Pattern,
    opts: &MatchOptions,
    ignore_field_norm: bool,
) -> Option<MatchResult> {
    let mut aggregate = 1.0_f64;
    let mut matches = Vec::new();

    for value in &record.values {
        let Some(hit) = pattern.match_folded(&value.folded, opts) else {
            continue;
        };
        let base = if hit.score == 0.0 { f64::EPSILON } else { hit.score };
        let norm = if ignore_field_norm { 1.0 } else { value.norm };
        aggregate *= base.powf(value.weight * norm);

        matches.push(FieldMatch {
            field: value.field,
            array_index: value.array_index,
            score: hit.score,
            ranges: hit.ranges,
        });
    }

    if matches.is_empty() {
        return None;
    }

    Some(MatchResult {
        position,
        id: record.id.clone(),
        score: aggregate,
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, RecordDraft};
    use chrono::Utc;

    fn person(id: &str, name: &str, notes: &str, where_met: &str, tags: &[&str]) -> Record {
        RecordDraft {
            name: Some(name.into()),
            notes: Some(notes.into()),
            where_met: Some(where_met.into()),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            ..RecordDraft::default()
        }
        .into_record(id.into(), Utc::now())
    }

    fn run(records: &[Record], query: &str) -> Vec<MatchResult> {
        search(&Index::with_default_fields(records), query, &SearchParams::default())
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let records = vec![person("r1", "Alice", "", "", &[])];
        assert!(run(&records, "").is_empty());
        assert!(run(&records, "   \t").is_empty());
    }

    #[test]
    fn test_empty_index_matches_nothing() {
        assert!(run(&[], "alice").is_empty());
    }

    #[test]
    fn test_misspelled_query_hits_notes_and_tag() {
        let records = vec![
            person("bob", "Bob Stone", "plays chess", "Portland", &["chess"]),
            person(
                "alice",
                "Alice Park",
                "met at a conference",
                "Seattle",
                &["work", "conference"],
            ),
        ];
        let results = run(&records, "confrence");

        assert_eq!(results.len(), 1);
        let alice = &results[0];
        assert_eq!(alice.id, "alice");
        assert_eq!(alice.position, 1);
        assert!(alice.field_match(Field::Notes, None).is_some());
        assert!(alice.field_match(Field::Tags, Some(1)).is_some());
        assert!(alice.field_match(Field::Tags, Some(0)).is_none());
        assert!(alice.score < 1.0);
    }

    #[test]
    fn test_tag_addressing() {
        let records = vec![person("r1", "Bob", "", "", &["cafe", "gym"])];
        let results = run(&records, "gym");

        assert_eq!(results.len(), 1);
        let tag_matches: Vec<_> = results[0]
            .matches
            .iter()
            .filter(|m| m.field == Field::Tags)
            .collect();
        assert_eq!(tag_matches.len(), 1);
        assert_eq!(tag_matches[0].array_index, Some(1));
        assert_eq!(tag_matches[0].ranges, vec![MatchRange::new(0, 2)]);
    }

    #[test]
    fn test_threshold_exclusion() {
        let records = vec![
            person("r1", "Alice", "likes hiking", "Denver", &["outdoors"]),
            person("r2", "Quentin", "xylophone", "Zurich", &["music"]),
        ];
        let results = run(&records, "hikng");
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1"]);
    }

    #[test]
    fn test_scores_non_decreasing() {
        let records = vec![
            person("r1", "Jordan", "met jordan's sister", "", &[]),
            person("r2", "Sam", "from jordan", "", &[]),
            person("r3", "Jordan", "", "", &["jordan"]),
            person("r4", "Jordy", "", "", &[]),
        ];
        let results = run(&records, "jordan");
        assert!(results.len() >= 3);
        for pair in results.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
    }

    #[test]
    fn test_name_outranks_where_met() {
        let records = vec![
            person("where", "Chris", "", "Berlin", &[]),
            person("name", "Berlin", "", "", &[]),
        ];
        let results = run(&records, "berlin");
        assert_eq!(results[0].id, "name");
        assert_eq!(results[1].id, "where");
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let records = vec![
            person("first", "Dana", "", "", &[]),
            person("second", "Dana", "", "", &[]),
            person("third", "Dana", "", "", &[]),
        ];
        let ids: Vec<String> = run(&records, "dana").into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_limit_truncates() {
        let records: Vec<Record> = (0..5)
            .map(|i| person(&format!("r{i}"), "Dana", "", "", &[]))
            .collect();
        let params = SearchParams {
            limit: Some(2),
            ..SearchParams::default()
        };
        let results = search(&Index::with_default_fields(&records), "dana", &params);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_long_field_penalized_unless_norm_ignored() {
        let records = vec![
            person("long", "X", "we talked about pottery for hours at the market", "", &[]),
            person("short", "Y", "pottery", "", &[]),
        ];
        let index = Index::with_default_fields(&records);

        let results = search(&index, "pottery", &SearchParams::default());
        assert_eq!(results[0].id, "short");

        let flat = SearchParams {
            ignore_field_norm: true,
            ..SearchParams::default()
        };
        let results = search(&index, "pottery", &flat);
        // "short" is an identical match (score 0), "long" a substring match.
        assert_eq!(results[0].id, "short");
        let long = results.iter().find(|r| r.id == "long").unwrap();
        let with_norm = search(&index, "pottery", &SearchParams::default());
        let long_norm = with_norm.iter().find(|r| r.id == "long").unwrap();
        assert!(long.score < long_norm.score);
    }

    #[test]
    fn test_search_is_repeatable() {
        let records = vec![person("r1", "Alice Park", "conference", "", &["work"])];
        let index = Index::with_default_fields(&records);
        let a = search(&index, "park", &SearchParams::default());
        let b = search(&index, "park", &SearchParams::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_match_result_serializes() {
        let records = vec![person("r1", "Bob", "", "", &["cafe", "gym"])];
        let results = run(&records, "gym");
        let json = serde_json::to_value(&results[0]).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["matches"][0]["field"], "tags");
        assert_eq!(json["matches"][0]["arrayIndex"], 1);
        assert_eq!(json["matches"][0]["ranges"], serde_json::json!([[0, 2]]));
    }
}

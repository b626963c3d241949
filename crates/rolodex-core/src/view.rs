//! Renderer-facing record views.
//!
//! A [`RecordView`] is what a renderer consumes: the record's identity, an
//! optional score, and every displayed field already split into highlight
//! segments. Views never contain markup.

use chrono::NaiveDate;
use serde::Serialize;

use crate::fields::Field;
use crate::highlight::{project, Segment};
use crate::models::Record;
use crate::search::MatchResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: String,
    /// Aggregate score; `None` in the unfiltered listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub name: Vec<Segment>,
    pub notes: Vec<Segment>,
    pub where_met: Vec<Segment>,
    pub when_met: Option<NaiveDate>,
    /// One segment list per tag, in tag order.
    pub tags: Vec<Vec<Segment>>,
}

impl RecordView {
    /// View with every field plain and no score.
    pub fn plain(record: &Record) -> Self {
        Self::build(record, None)
    }

    /// View highlighted with the ranges of `result`.
    pub fn from_match(record: &Record, result: &MatchResult) -> Self {
        Self::build(record, Some(result))
    }

    fn build(record: &Record, result: Option<&MatchResult>) -> Self {
        Self {
            id: record.id.clone(),
            score: result.map(|r| r.score),
            name: project_field(&record.name, result, Field::Name, None),
            notes: project_field(&record.notes, result, Field::Notes, None),
            where_met: project_field(&record.where_met, result, Field::WhereMet, None),
            when_met: record.when_met,
            tags: record
                .tags
                .iter()
                .enumerate()
                .map(|(i, tag)| project_field(tag, result, Field::Tags, Some(i)))
                .collect(),
        }
    }
}

fn project_field(
    text: &str,
    result: Option<&MatchResult>,
    field: Field,
    array_index: Option<usize>,
) -> Vec<Segment> {
    match result.and_then(|r| r.field_match(field, array_index)) {
        Some(m) => project(text, &m.ranges),
        None => vec![Segment::plain(text)],
    }
}

/// Unfiltered listing: records in their given order, all plain.
pub fn listing(records: &[Record]) -> Vec<RecordView> {
    records.iter().map(RecordView::plain).collect()
}

/// Ranked listing for search results over `records`.
///
/// Results whose position is outside `records` are skipped.
pub fn ranked(records: &[Record], results: &[MatchResult]) -> Vec<RecordView> {
    results
        .iter()
        .filter_map(|result| {
            records
                .get(result.position)
                .map(|record| RecordView::from_match(record, result))
        })
        .collect()
}

//! Search index over a record collection snapshot.
//!
//! The [`Index`] precomputes everything the query engine needs per field
//! value: the case-folded characters, the normalized field weight, and the
//! field-length norm. It is built once per snapshot and never mutated; any
//! change to the collection means building a new one.

use serde::Serialize;

use crate::fields::{Field, SearchableField, DEFAULT_FIELDS};
use crate::fuzzy::fold;
use crate::models::Record;

/// One searchable text of one record.
#[derive(Debug, Clone)]
pub struct IndexedValue {
    pub field: Field,
    /// Position within a list-valued field, `None` for single texts.
    pub array_index: Option<usize>,
    pub folded: Vec<char>,
    /// Field weight divided by the total weight of all indexed fields.
    pub weight: f64,
    /// Field-length norm, see [`field_norm`].
    pub norm: f64,
}

/// All indexed values for one record, in field order.
#[derive(Debug, Clone)]
pub struct IndexedRecord {
    pub id: String,
    pub values: Vec<IndexedValue>,
}

/// Summary counts, for logging and `rdx` diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub records: usize,
    pub values: usize,
}

/// Immutable search index over one collection snapshot.
///
/// Record positions in the index equal positions in the slice passed to
/// [`Index::build`].
#[derive(Debug, Clone)]
pub struct Index {
    fields: Vec<SearchableField>,
    records: Vec<IndexedRecord>,
}

impl Index {
    /// Build an index over `records` for the given searchable fields.
    ///
    /// Empty texts are not indexed since they can never match.
    pub fn build(records: &[Record], fields: &[SearchableField]) -> Self {
        let fields = normalize_weights(fields);

        let records: Vec<IndexedRecord> = records
            .iter()
            .map(|record| IndexedRecord {
                id: record.id.clone(),
                values: fields
                    .iter()
                    .flat_map(|sf| {
                        sf.field
                            .extract(record)
                            .texts()
                            .filter(|(_, text)| !text.is_empty())
                            .map(move |(array_index, text)| IndexedValue {
                                field: sf.field,
                                array_index,
                                folded: fold(text),
                                weight: sf.weight,
                                norm: field_norm(text),
                            })
                    })
                    .collect(),
            })
            .collect();

        let index = Self { fields, records };
        let stats = index.stats();
        tracing::debug!(
            records = stats.records,
            values = stats.values,
            "built search index"
        );
        index
    }

    /// Build with the default name/notes/whereMet/tags weights.
    pub fn with_default_fields(records: &[Record]) -> Self {
        Self::build(records, &DEFAULT_FIELDS)
    }

    pub fn records(&self) -> &[IndexedRecord] {
        &self.records
    }

    /// Searchable fields with their normalized weights.
    pub fn fields(&self) -> &[SearchableField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.records.len(),
            values: self.records.iter().map(|r| r.values.len()).sum(),
        }
    }
}

/// Scale weights so they sum to one. Non-positive totals are left as is.
fn normalize_weights(fields: &[SearchableField]) -> Vec<SearchableField> {
    let total: f64 = fields.iter().map(|f| f.weight).sum();
    fields
        .iter()
        .map(|f| SearchableField {
            field: f.field,
            weight: if total > 0.0 { f.weight / total } else { f.weight },
        })
        .collect()
}

/// Field-length norm: `1 / sqrt(tokens)`, rounded to three decimals.
///
/// Tokens are maximal runs of non-space characters; an all-space text
/// counts as one token.
pub fn field_norm(text: &str) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count().max(1);
    let norm = 1.0 / (tokens as f64).sqrt();
    (norm * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordDraft;
    use chrono::Utc;

    fn record(id: &str, name: &str, notes: &str, tags: &[&str]) -> Record {
        RecordDraft {
            name: Some(name.into()),
            notes: Some(notes.into()),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            ..RecordDraft::default()
        }
        .into_record(id.into(), Utc::now())
    }

    #[test]
    fn test_empty_collection() {
        let index = Index::with_default_fields(&[]);
        assert!(index.is_empty());
        assert_eq!(index.stats(), IndexStats { records: 0, values: 0 });
    }

    #[test]
    fn test_empty_texts_not_indexed() {
        let index = Index::with_default_fields(&[record("r1", "Alice", "", &["a", ""])]);
        let values = &index.records()[0].values;
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].field, Field::Name);
        assert_eq!(values[1].field, Field::Tags);
        assert_eq!(values[1].array_index, Some(0));
    }

    #[test]
    fn test_positions_follow_input_order() {
        let records = vec![record("b", "B", "", &[]), record("a", "A", "", &[])];
        let index = Index::with_default_fields(&records);
        let ids: Vec<&str> = index.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_weights_normalized() {
        let fields = [
            SearchableField::new(Field::Name, 2.0),
            SearchableField::new(Field::Notes, 2.0),
        ];
        let index = Index::build(&[], &fields);
        assert!((index.fields()[0].weight - 0.5).abs() < 1e-9);
        assert!((index.fields()[1].weight - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_folded_text() {
        let index = Index::with_default_fields(&[record("r1", "ALICE", "", &[])]);
        assert_eq!(index.records()[0].values[0].folded, vec!['a', 'l', 'i', 'c', 'e']);
    }

    #[test]
    fn test_field_norm() {
        assert_eq!(field_norm("one"), 1.0);
        assert_eq!(field_norm("two words"), 0.707);
        assert_eq!(field_norm("a b c d"), 0.5);
        assert_eq!(field_norm("   "), 1.0);
    }
}

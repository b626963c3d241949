//! Searchable fields and their ranking weights.
//!
//! Each [`SearchableField`] names a record field, how much a hit on it
//! counts toward the aggregate score, and (through [`Field::extract`]) how
//! to read its text off a [`Record`].

use serde::Serialize;

use crate::models::Record;

/// A record field that participates in search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Notes,
    WhereMet,
    Tags,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Notes, Field::WhereMet, Field::Tags];

    /// Key used in the export format and in match output.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Notes => "notes",
            Field::WhereMet => "whereMet",
            Field::Tags => "tags",
        }
    }

    pub fn extract(self, record: &Record) -> FieldValue<'_> {
        match self {
            Field::Name => FieldValue::Text(&record.name),
            Field::Notes => FieldValue::Text(&record.notes),
            Field::WhereMet => FieldValue::Text(&record.where_met),
            Field::Tags => FieldValue::List(&record.tags),
        }
    }
}

/// The value of one field on one record.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
}

impl<'a> FieldValue<'a> {
    /// Iterate the individual texts of this value.
    ///
    /// Single texts yield `(None, text)`; list elements yield their array
    /// index alongside the text.
    pub fn texts(self) -> Box<dyn Iterator<Item = (Option<usize>, &'a str)> + 'a> {
        match self {
            FieldValue::Text(text) => Box::new(std::iter::once((None, text))),
            FieldValue::List(items) => Box::new(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (Some(i), item.as_str())),
            ),
        }
    }
}

/// A field together with its ranking weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchableField {
    pub field: Field,
    pub weight: f64,
}

impl SearchableField {
    pub const fn new(field: Field, weight: f64) -> Self {
        Self { field, weight }
    }
}

/// Default field weights: name 0.5, notes 0.3, whereMet 0.1, tags 0.1.
pub const DEFAULT_FIELDS: [SearchableField; 4] = [
    SearchableField::new(Field::Name, 0.5),
    SearchableField::new(Field::Notes, 0.3),
    SearchableField::new(Field::WhereMet, 0.1),
    SearchableField::new(Field::Tags, 0.1),
];

//! Core data models used throughout Rolodex.
//!
//! A [`Record`] is one person the user has met. Records are owned by a
//! [`RecordStore`](crate::store::RecordStore); the search core only ever
//! reads them.
//!
//! Decoding is tolerant: a record coming from an import file may carry
//! missing or wrongly-typed optional fields, and those are defaulted to
//! empty rather than rejected so partial records stay searchable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Date format used for `whenMet` in JSON and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored person record.
///
/// Serializes with the camelCase keys of the export format
/// (`whereMet`, `whenMet`, `createdAt`). `whenMet` is written as
/// `"YYYY-MM-DD"`, or `""` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub where_met: String,
    #[serde(
        default,
        serialize_with = "serialize_date",
        deserialize_with = "lenient_date"
    )]
    pub when_met: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or importing a record.
///
/// Every field is optional. [`RecordDraft::from_value`] never fails: any
/// field with an unexpected JSON shape is treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub where_met: Option<String>,
    pub when_met: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl RecordDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Decode a draft from an arbitrary JSON value.
    ///
    /// Non-object values produce an empty draft.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            id: text("id").filter(|id| !id.is_empty()),
            name: text("name"),
            notes: text("notes"),
            where_met: text("whereMet"),
            when_met: obj.get("whenMet").and_then(date_from_value),
            tags: obj.get("tags").and_then(|v| v.is_array().then(|| tags_from_value(v))),
            created_at: obj.get("createdAt").and_then(timestamp_from_value),
        }
    }

    /// Trim surrounding whitespace from the free-text fields.
    pub fn trimmed(mut self) -> Self {
        for field in [&mut self.name, &mut self.notes, &mut self.where_met] {
            if let Some(s) = field {
                *s = s.trim().to_string();
            }
        }
        self
    }

    /// Materialize the draft into a record with the given identity and
    /// fallback creation time. Absent fields become empty.
    pub fn into_record(self, id: String, now: DateTime<Utc>) -> Record {
        Record {
            id,
            name: self.name.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            where_met: self.where_met.unwrap_or_default(),
            when_met: self.when_met,
            tags: self.tags.unwrap_or_default(),
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

impl<'de> Deserialize<'de> for RecordDraft {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Partial update for an existing record. `None` keeps the previous value.
///
/// `when_met` is doubly optional so a patch can clear the date
/// (`Some(None)`) as well as leave it alone (`None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub where_met: Option<String>,
    pub when_met: Option<Option<NaiveDate>>,
    pub tags: Option<Vec<String>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.notes.is_none()
            && self.where_met.is_none()
            && self.when_met.is_none()
            && self.tags.is_none()
    }

    pub fn apply(&self, record: &mut Record) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
        if let Some(where_met) = &self.where_met {
            record.where_met = where_met.clone();
        }
        if let Some(when_met) = self.when_met {
            record.when_met = when_met;
        }
        if let Some(tags) = &self.tags {
            record.tags = tags.clone();
        }
    }
}

/// Identifier policy for [`bulk_import`](crate::store::RecordStore::bulk_import).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Keep an incoming identifier when present, overwriting any record
    /// that already has it.
    #[default]
    Merge,
    /// Always assign a fresh identifier.
    NewIds,
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merge" => Ok(ImportMode::Merge),
            "newIds" | "new-ids" | "new_ids" => Ok(ImportMode::NewIds),
            other => Err(format!(
                "unknown import mode '{}'. Use merge or new-ids.",
                other
            )),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Merge => f.write_str("merge"),
            ImportMode::NewIds => f.write_str("new-ids"),
        }
    }
}

/// Split a comma-separated tag list, trimming entries and dropping empties.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn text_from_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn tags_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn date_from_value(value: &Value) -> Option<NaiveDate> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
}

fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text_from_value(&Value::deserialize(deserializer)?))
}

fn lenient_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(tags_from_value(&Value::deserialize(deserializer)?))
}

fn lenient_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    Ok(date_from_value(&Value::deserialize(deserializer)?))
}

fn serialize_date<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => s.serialize_str(&d.format(DATE_FORMAT).to_string()),
        None => s.serialize_str(""),
    }
}

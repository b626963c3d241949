//! Explicit owner of the current record collection and its search index.
//!
//! A [`Snapshot`] pairs a list of records with the [`Index`] built from
//! exactly those records, so a query can never run against a stale index.
//! [`Collection`] holds the current snapshot behind an `Arc`; rebuilding
//! swaps in a new one and leaves snapshots already handed out untouched.

use std::sync::Arc;

use anyhow::Result;

use crate::fields::{SearchableField, DEFAULT_FIELDS};
use crate::index::Index;
use crate::models::Record;
use crate::search::{search, MatchResult, SearchParams};
use crate::store::RecordStore;
use crate::view::{listing, ranked, RecordView};

/// Immutable records + index pair.
#[derive(Debug)]
pub struct Snapshot {
    records: Vec<Record>,
    index: Index,
    params: SearchParams,
}

impl Snapshot {
    pub fn build(records: Vec<Record>, fields: &[SearchableField], params: SearchParams) -> Self {
        let index = Index::build(&records, fields);
        Self {
            records,
            index,
            params,
        }
    }

    /// Records in the order they were given (store listing order).
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Ranked matches for a non-empty query; empty for a blank one.
    pub fn search(&self, query: &str) -> Vec<MatchResult> {
        search(&self.index, query, &self.params)
    }

    /// The record a result refers to.
    pub fn record(&self, result: &MatchResult) -> Option<&Record> {
        self.records.get(result.position)
    }

    /// What to display for `query`.
    ///
    /// A blank query skips the engine and yields the unfiltered listing in
    /// collection order; anything else yields the ranked, highlighted hits.
    pub fn views(&self, query: &str) -> Vec<RecordView> {
        if query.trim().is_empty() {
            listing(&self.records)
        } else {
            ranked(&self.records, &self.search(query))
        }
    }
}

/// Owner of the current [`Snapshot`].
#[derive(Debug)]
pub struct Collection {
    fields: Vec<SearchableField>,
    params: SearchParams,
    current: Arc<Snapshot>,
}

impl Collection {
    /// An empty collection with the given fields and parameters.
    pub fn new(fields: Vec<SearchableField>, params: SearchParams) -> Self {
        let current = Arc::new(Snapshot::build(Vec::new(), &fields, params));
        Self {
            fields,
            params,
            current,
        }
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        let mut collection = Self::default();
        collection.replace(records);
        collection
    }

    /// Rebuild the index over `records` and make it current.
    pub fn replace(&mut self, records: Vec<Record>) -> Arc<Snapshot> {
        self.current = Arc::new(Snapshot::build(records, &self.fields, self.params));
        Arc::clone(&self.current)
    }

    /// Reload every record from `store` and rebuild.
    ///
    /// Call after each successful mutation and on startup.
    pub async fn refresh<S: RecordStore + ?Sized>(&mut self, store: &S) -> Result<Arc<Snapshot>> {
        let records = store.list().await?;
        Ok(self.replace(records))
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    pub fn search(&self, query: &str) -> Vec<MatchResult> {
        self.current.search(query)
    }

    pub fn views(&self, query: &str) -> Vec<RecordView> {
        self.current.views(query)
    }

    pub fn len(&self) -> usize {
        self.current.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.records.is_empty()
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new(DEFAULT_FIELDS.to_vec(), SearchParams::default())
    }
}

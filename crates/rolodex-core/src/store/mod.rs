//! Storage abstraction for Rolodex records.
//!
//! The [`RecordStore`] trait is everything the application needs from a
//! persistence layer, enabling pluggable backends (SQLite, in-memory).
//! The search core never calls a store: callers list the records, hand the
//! snapshot to a [`Collection`](crate::collection::Collection), and rebuild
//! it after every successful mutation.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ImportMode, Record, RecordDraft, RecordPatch};

/// Typed store failures.
///
/// Store methods return [`anyhow::Result`]; these variants travel inside
/// it and can be recovered with `err.downcast_ref::<StoreError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Record already exists: {0}")]
    Duplicate(String),
}

/// Abstract record store.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list`](RecordStore::list) | All records, newest first |
/// | [`get`](RecordStore::get) | One record by id |
/// | [`add`](RecordStore::add) | Create a record |
/// | [`update`](RecordStore::update) | Patch an existing record |
/// | [`delete`](RecordStore::delete) | Remove a record |
/// | [`bulk_import`](RecordStore::bulk_import) | Write many records at once |
/// | [`export_all`](RecordStore::export_all) | Full snapshot for export |
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records ordered by `created_at` descending, ties by id ascending.
    async fn list(&self) -> Result<Vec<Record>>;

    async fn get(&self, id: &str) -> Result<Option<Record>>;

    /// Create a record from a draft.
    ///
    /// Assigns a fresh id and the current time when absent, and trims
    /// `name`, `notes` and `where_met`. Fails with
    /// [`StoreError::Duplicate`] if the draft's id is taken.
    async fn add(&self, draft: RecordDraft) -> Result<Record>;

    /// Apply a patch. Fails with [`StoreError::NotFound`] for unknown ids.
    async fn update(&self, id: &str, patch: RecordPatch) -> Result<Record>;

    /// Remove a record. Unknown ids are ignored.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Write all drafts in one all-or-nothing batch, returning the count.
    ///
    /// See [`prepare_import`] for the identifier policy.
    async fn bulk_import(&self, drafts: Vec<RecordDraft>, mode: ImportMode) -> Result<usize>;

    /// Full snapshot in [`list`](RecordStore::list) order.
    async fn export_all(&self) -> Result<Vec<Record>> {
        self.list().await
    }
}

/// Generate a new record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Turn a draft into a record for [`RecordStore::add`].
pub fn prepare_add(draft: RecordDraft) -> Record {
    let draft = draft.trimmed();
    let id = draft.id.clone().unwrap_or_else(new_id);
    draft.into_record(id, chrono::Utc::now())
}

/// Turn import drafts into records.
///
/// [`ImportMode::Merge`] keeps a present id; [`ImportMode::NewIds`] always
/// assigns a fresh one. Either way a missing `created_at` becomes now and
/// missing tags become empty.
pub fn prepare_import(drafts: Vec<RecordDraft>, mode: ImportMode) -> Vec<Record> {
    let now = chrono::Utc::now();
    drafts
        .into_iter()
        .map(|draft| {
            let id = match (mode, draft.id.clone()) {
                (ImportMode::Merge, Some(id)) => id,
                _ => new_id(),
            };
            draft.into_record(id, now)
        })
        .collect()
}

/// Sort records newest first, ties by id ascending.
pub fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_add_assigns_id_and_trims() {
        let record = prepare_add(RecordDraft::named("  Alice  "));
        assert_eq!(record.name, "Alice");
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_prepare_add_keeps_given_id() {
        let draft = RecordDraft {
            id: Some("fixed".into()),
            ..RecordDraft::named("A")
        };
        assert_eq!(prepare_add(draft).id, "fixed");
    }

    #[test]
    fn test_prepare_import_modes() {
        let draft = RecordDraft {
            id: Some("keep-me".into()),
            ..RecordDraft::named("X")
        };

        let merged = prepare_import(vec![draft.clone()], ImportMode::Merge);
        assert_eq!(merged[0].id, "keep-me");

        let fresh = prepare_import(vec![draft], ImportMode::NewIds);
        assert_ne!(fresh[0].id, "keep-me");

        let no_id = prepare_import(vec![RecordDraft::named("X")], ImportMode::Merge);
        assert!(!no_id[0].id.is_empty());
        assert!(no_id[0].tags.is_empty());
    }

    #[test]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::NotFound("abc".into()).to_string(),
            "Record not found: abc"
        );
    }
}

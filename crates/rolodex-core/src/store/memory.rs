//! In-memory [`RecordStore`] implementation for tests and library use.
//!
//! Uses a `HashMap` behind `std::sync::RwLock` for thread safety. Every
//! operation takes the lock once, so each call is atomic.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{ImportMode, Record, RecordDraft, RecordPatch};

use super::{prepare_add, prepare_import, sort_newest_first, RecordStore, StoreError};

/// In-memory store for tests and embedders that persist elsewhere.
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Record>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Record>> {
        let records = self.records.read().map_err(poisoned)?;
        let mut all: Vec<Record> = records.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn get(&self, id: &str) -> Result<Option<Record>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(id).cloned())
    }

    async fn add(&self, draft: RecordDraft) -> Result<Record> {
        let record = prepare_add(draft);
        let mut records = self.records.write().map_err(poisoned)?;
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id).into());
        }
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: RecordPatch) -> Result<Record> {
        let mut records = self.records.write().map_err(poisoned)?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.remove(id);
        Ok(())
    }

    async fn bulk_import(&self, drafts: Vec<RecordDraft>, mode: ImportMode) -> Result<usize> {
        let prepared = prepare_import(drafts, mode);
        let count = prepared.len();
        let mut records = self.records.write().map_err(poisoned)?;
        for record in prepared {
            records.insert(record.id.clone(), record);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn dated(name: &str, day: u32) -> RecordDraft {
        RecordDraft {
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).single(),
            ..RecordDraft::named(name)
        }
    }

    #[tokio::test]
    async fn test_add_and_list_newest_first() {
        let store = InMemoryStore::new();
        store.add(dated("old", 1)).await.unwrap();
        store.add(dated("new", 3)).await.unwrap();
        store.add(dated("mid", 2)).await.unwrap();

        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_add_duplicate_id_fails() {
        let store = InMemoryStore::new();
        let draft = RecordDraft {
            id: Some("same".into()),
            ..RecordDraft::named("A")
        };
        store.add(draft.clone()).await.unwrap();
        let err = store.add(draft).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::Duplicate("same".into()))
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .update("missing", RecordPatch::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::NotFound("missing".into()))
        );
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryStore::new();
        let added = store
            .add(RecordDraft {
                notes: Some("keep".into()),
                ..RecordDraft::named("Before")
            })
            .await
            .unwrap();

        let patch = RecordPatch {
            name: Some("After".into()),
            ..RecordPatch::default()
        };
        let updated = store.update(&added.id, patch).await.unwrap();
        assert_eq!(updated.name, "After");
        assert_eq!(updated.notes, "keep");
        assert_eq!(updated.created_at, added.created_at);
        assert_eq!(store.get(&added.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::new();
        let added = store.add(RecordDraft::named("Gone")).await.unwrap();
        store.delete(&added.id).await.unwrap();
        store.delete("never-existed").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_import_new_ids_twice() {
        let store = InMemoryStore::new();
        let batch = || vec![RecordDraft::named("X")];
        assert_eq!(store.bulk_import(batch(), ImportMode::NewIds).await.unwrap(), 1);
        assert_eq!(store.bulk_import(batch(), ImportMode::NewIds).await.unwrap(), 1);

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_ne!(all[0].id, all[1].id);
    }

    #[tokio::test]
    async fn test_bulk_import_merge_reuses_id() {
        let store = InMemoryStore::new();
        let draft = RecordDraft {
            id: Some("preset".into()),
            ..RecordDraft::named("X")
        };
        store.bulk_import(vec![draft.clone()], ImportMode::Merge).await.unwrap();
        store.bulk_import(vec![draft], ImportMode::Merge).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "preset");
    }

    #[tokio::test]
    async fn test_export_matches_list() {
        let store = InMemoryStore::new();
        store.add(dated("a", 1)).await.unwrap();
        store.add(dated("b", 2)).await.unwrap();
        assert_eq!(store.export_all().await.unwrap(), store.list().await.unwrap());
    }
}

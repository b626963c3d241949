//! SQLite-backed [`RecordStore`] implementation.
//!
//! Records live in a single `records` table (see [`crate::migrate`]).
//! Mutations that read before writing run inside a transaction, and
//! [`bulk_import`](RecordStore::bulk_import) writes its whole batch in one
//! transaction so a failed import leaves the table untouched.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use rolodex_core::models::{ImportMode, Record, RecordDraft, RecordPatch, DATE_FORMAT};
use rolodex_core::store::{prepare_add, prepare_import, RecordStore, StoreError};

use crate::config::Config;
use crate::db;
use crate::migrate;

const SELECT_RECORD: &str =
    "SELECT id, name, notes, where_met, when_met, tags, created_at FROM records";

/// SQLite implementation of the [`RecordStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database, creating the schema if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::migrate_pool(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn to_micros(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn from_micros(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or_default()
}

/// Drop sub-microsecond precision so returned records equal stored ones.
fn normalize(mut record: Record) -> Record {
    record.created_at = from_micros(to_micros(&record.created_at));
    record
}

fn row_to_record(row: &SqliteRow) -> Record {
    let when_met: Option<String> = row.get("when_met");
    let tags_json: String = row.get("tags");
    let created_at: i64 = row.get("created_at");

    Record {
        id: row.get("id"),
        name: row.get("name"),
        notes: row.get("notes"),
        where_met: row.get("where_met"),
        when_met: when_met.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        created_at: from_micros(created_at),
    }
}

async fn fetch_one_record(conn: &mut SqliteConnection, id: &str) -> Result<Option<Record>> {
    let row = sqlx::query(&format!("{SELECT_RECORD} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.as_ref().map(row_to_record))
}

async fn put_record(conn: &mut SqliteConnection, record: &Record) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO records (id, name, notes, where_met, when_met, tags, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            notes = excluded.notes,
            where_met = excluded.where_met,
            when_met = excluded.when_met,
            tags = excluded.tags,
            created_at = excluded.created_at
        "#,
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.notes)
    .bind(&record.where_met)
    .bind(record.when_met.map(|d| d.format(DATE_FORMAT).to_string()))
    .bind(serde_json::to_string(&record.tags)?)
    .bind(to_micros(&record.created_at))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn list(&self) -> Result<Vec<Record>> {
        let rows = sqlx::query(&format!("{SELECT_RECORD} ORDER BY created_at DESC, id ASC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Record>> {
        let mut conn = self.pool.acquire().await?;
        fetch_one_record(&mut conn, id).await
    }

    async fn add(&self, draft: RecordDraft) -> Result<Record> {
        let record = normalize(prepare_add(draft));
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM records WHERE id = ?")
            .bind(&record.id)
            .fetch_one(&mut *tx)
            .await?;
        if exists {
            return Err(StoreError::Duplicate(record.id).into());
        }

        put_record(&mut tx, &record).await?;
        tx.commit().await?;
        tracing::debug!(id = %record.id, "added record");
        Ok(record)
    }

    async fn update(&self, id: &str, patch: RecordPatch) -> Result<Record> {
        let mut tx = self.pool.begin().await?;
        let mut record = fetch_one_record(&mut tx, id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        patch.apply(&mut record);
        put_record(&mut tx, &record).await?;
        tx.commit().await?;
        tracing::debug!(id, "updated record");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::debug!(id, "deleted record");
        Ok(())
    }

    async fn bulk_import(&self, drafts: Vec<RecordDraft>, mode: ImportMode) -> Result<usize> {
        let records: Vec<Record> = prepare_import(drafts, mode)
            .into_iter()
            .map(normalize)
            .collect();

        let mut tx = self.pool.begin().await?;
        for record in &records {
            put_record(&mut tx, record).await?;
        }
        tx.commit().await?;

        tracing::debug!(count = records.len(), %mode, "imported records");
        Ok(records.len())
    }
}

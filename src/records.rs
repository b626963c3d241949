//! Record management commands: `add`, `list`, `show`, `edit`, `delete`.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use rolodex_core::models::{parse_tags, RecordDraft, RecordPatch, DATE_FORMAT};
use rolodex_core::store::{RecordStore, StoreError};
use rolodex_core::view::{listing, RecordView};

use crate::config::Config;
use crate::render::{self, HighlightStyle, OutputFormat};
use crate::sqlite_store::SqliteStore;

/// Field values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct RecordInput {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub where_met: Option<String>,
    pub when_met: Option<String>,
    pub tags: Option<String>,
}

/// Parse a `YYYY-MM-DD` date from the command line.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", input))
}

fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Name must not be empty");
    }
    Ok(())
}

impl RecordInput {
    pub fn into_draft(self) -> Result<RecordDraft> {
        let name = self.name.unwrap_or_default();
        require_name(&name)?;

        Ok(RecordDraft {
            name: Some(name),
            notes: self.notes,
            where_met: self.where_met,
            when_met: self.when_met.as_deref().map(parse_date).transpose()?,
            tags: self.tags.as_deref().map(parse_tags),
            ..RecordDraft::default()
        })
    }

    /// An empty `when_met` clears the stored date.
    pub fn into_patch(self) -> Result<RecordPatch> {
        if let Some(name) = &self.name {
            require_name(name)?;
        }

        let when_met = match self.when_met.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(date) => Some(Some(parse_date(date)?)),
        };

        Ok(RecordPatch {
            name: self.name.map(|s| s.trim().to_string()),
            notes: self.notes.map(|s| s.trim().to_string()),
            where_met: self.where_met.map(|s| s.trim().to_string()),
            when_met,
            tags: self.tags.as_deref().map(parse_tags),
        })
    }
}

pub async fn run_add(config: &Config, input: RecordInput) -> Result<()> {
    let draft = input.into_draft()?;
    let store = SqliteStore::open(config).await?;
    let record = store.add(draft).await?;
    store.close().await;

    println!("Added {} ({})", record.name, record.id);
    Ok(())
}

pub async fn run_list(config: &Config, format: &str) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let store = SqliteStore::open(config).await?;
    let records = store.list().await?;
    store.close().await;

    print!(
        "{}",
        render::render(&listing(&records), format, HighlightStyle::default_for_tty())?
    );
    Ok(())
}

pub async fn run_show(config: &Config, id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let record = store.get(id).await?;
    store.close().await;

    let Some(record) = record else {
        bail!(StoreError::NotFound(id.to_string()));
    };

    let created = record.created_at.format("%Y-%m-%d %H:%M:%S UTC");
    print!(
        "{}",
        render::text_view(&RecordView::plain(&record), 1, HighlightStyle::Brackets)
    );
    println!("    created: {}", created);
    Ok(())
}

pub async fn run_edit(config: &Config, id: &str, input: RecordInput) -> Result<()> {
    let patch = input.into_patch()?;
    if patch.is_empty() {
        bail!("Nothing to change. Pass at least one of --name, --notes, --where-met, --when-met, --tags.");
    }

    let store = SqliteStore::open(config).await?;
    let record = store.update(id, patch).await;
    store.close().await;
    let record = record?;

    println!("Updated {} ({})", record.name, record.id);
    Ok(())
}

pub async fn run_delete(config: &Config, id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    store.delete(id).await?;
    store.close().await;

    println!("Deleted {}", id);
    Ok(())
}

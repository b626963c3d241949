//! JSON export and import of the whole collection.
//!
//! The file format is a JSON array of record objects with camelCase keys.
//! Import only requires the top level to be an array; each element is
//! decoded tolerantly, so missing or mistyped fields become empty.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

use rolodex_core::models::{ImportMode, RecordDraft};
use rolodex_core::store::RecordStore;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Export all records as pretty-printed JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let records = store.export_all().await?;
    store.close().await;

    let json = serde_json::to_string_pretty(&records)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write export file: {}", path.display()))?;
            eprintln!("Exported {} records to {}", records.len(), path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Decode an import payload into drafts.
pub fn parse_import(json: &str) -> Result<Vec<RecordDraft>> {
    let value: Value = serde_json::from_str(json).context("Import file is not valid JSON")?;
    let Value::Array(items) = value else {
        bail!("Import file must contain a JSON array of records");
    };
    Ok(items.iter().map(RecordDraft::from_value).collect())
}

pub async fn run_import(config: &Config, file: &Path, mode: &str) -> Result<()> {
    let mode: ImportMode = mode.parse().map_err(anyhow::Error::msg)?;
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {}", file.display()))?;
    let drafts = parse_import(&json)?;

    let store = SqliteStore::open(config).await?;
    let count = store.bulk_import(drafts, mode).await;
    store.close().await;
    let count = count?;

    println!("Imported {} records ({})", count, mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_tolerant() {
        let drafts = parse_import(
            r#"[
                {"id": "a", "name": "Alice", "tags": ["cafe", 3], "whenMet": "2024-05-01"},
                {"name": 42, "notes": null},
                "junk"
            ]"#,
        )
        .unwrap();

        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].id.as_deref(), Some("a"));
        assert_eq!(
            drafts[0].tags,
            Some(vec!["cafe".to_string(), "3".to_string()])
        );
        assert_eq!(drafts[1].name, None);
        assert_eq!(drafts[2], RecordDraft::default());
    }

    #[test]
    fn test_parse_import_rejects_invalid_json() {
        let err = parse_import("[{").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_parse_import_rejects_non_array() {
        let err = parse_import(r#"{"name": "Alice"}"#).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }
}

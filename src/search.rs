//! `rdx search`: fuzzy search over the stored collection.
//!
//! Loads every record, builds a [`Collection`] snapshot with the configured
//! field weights and match parameters, and renders ranked, highlighted
//! views. A blank query falls back to the full listing.

use anyhow::{bail, Result};

use rolodex_core::collection::Collection;
use rolodex_core::store::RecordStore;
use rolodex_core::view::RecordView;

use crate::config::Config;
use crate::render::{self, HighlightStyle, OutputFormat};
use crate::sqlite_store::SqliteStore;

/// Collection configured from `[search]`, with an optional limit override.
pub fn collection_for(config: &Config, limit: Option<usize>) -> Collection {
    let mut params = config.search.params();
    if limit.is_some() {
        params.limit = limit;
    }
    Collection::new(config.search.fields(), params)
}

/// Views for `query` over everything in `store`.
pub async fn search_views<S: RecordStore + ?Sized>(
    store: &S,
    config: &Config,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<RecordView>> {
    let mut collection = collection_for(config, limit);
    collection.refresh(store).await?;
    Ok(collection.views(query))
}

pub async fn run_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    format: &str,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    if limit == Some(0) {
        bail!("--limit must be >= 1");
    }

    let store = SqliteStore::open(config).await?;
    let views = search_views(&store, config, query, limit).await?;
    store.close().await;

    print!(
        "{}",
        render::render(&views, format, HighlightStyle::default_for_tty())?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::highlight::concat;
    use rolodex_core::models::RecordDraft;
    use rolodex_core::store::memory::InMemoryStore;

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .add(RecordDraft {
                notes: Some("met at a conference".into()),
                where_met: Some("Seattle".into()),
                tags: Some(vec!["cafe".into(), "gym".into()]),
                ..RecordDraft::named("Alice Park")
            })
            .await
            .unwrap();
        store
            .add(RecordDraft {
                notes: Some("neighbour".into()),
                ..RecordDraft::named("Bob Stone")
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_search_views_highlight() {
        let store = seeded().await;
        let config = Config::minimal("unused.sqlite");
        let views = search_views(&store, &config, "confrence", None).await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(concat(&views[0].name), "Alice Park");
        assert!(views[0].notes.iter().any(|s| s.is_matched()));
        assert_eq!(concat(&views[0].notes), "met at a conference");
    }

    #[tokio::test]
    async fn test_blank_query_lists_everything() {
        let store = seeded().await;
        let config = Config::minimal("unused.sqlite");
        let views = search_views(&store, &config, "  ", None).await.unwrap();
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.score.is_none()));
    }

    #[tokio::test]
    async fn test_limit_override() {
        let store = seeded().await;
        let mut config = Config::minimal("unused.sqlite");
        config.search.threshold = 1.0;
        let all = search_views(&store, &config, "park", None).await.unwrap();
        assert!(!all.is_empty());
        let one = search_views(&store, &config, "park", Some(1)).await.unwrap();
        assert_eq!(one.len(), 1);
    }
}

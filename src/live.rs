//! `rdx live`: interactive search-as-you-type over stdin.
//!
//! Each line read from stdin is a query. Lines arriving faster than the
//! configured `search.debounce_ms` supersede each other; only the last
//! line of a burst is searched. The collection snapshot is built once at
//! startup.

use anyhow::Result;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use rolodex_core::collection::Snapshot;

use crate::config::Config;
use crate::render::{self, HighlightStyle};
use crate::search::collection_for;
use crate::sqlite_store::SqliteStore;

/// Collapses bursts of values into the last one.
///
/// [`next`](Debouncer::next) waits for a value, then keeps replacing it
/// while newer values arrive within `delay` of each other.
pub struct Debouncer<T> {
    rx: mpsc::UnboundedReceiver<T>,
    delay: Duration,
}

impl<T> Debouncer<T> {
    pub fn new(rx: mpsc::UnboundedReceiver<T>, delay: Duration) -> Self {
        Self { rx, delay }
    }

    /// The next settled value, or `None` once the sender is gone and
    /// nothing is pending.
    pub async fn next(&mut self) -> Option<T> {
        let mut pending = self.rx.recv().await?;
        loop {
            match tokio::time::timeout(self.delay, self.rx.recv()).await {
                Ok(Some(newer)) => pending = newer,
                Ok(None) | Err(_) => return Some(pending),
            }
        }
    }
}

fn print_results(snapshot: &Snapshot, query: &str, style: HighlightStyle) {
    let views = snapshot.views(query);
    println!("> {}", query);
    print!("{}", render::text_listing(&views, style));
    println!();
}

pub async fn run_live(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let mut collection = collection_for(config, None);
    let snapshot = collection.refresh(&store).await?;
    store.close().await;

    eprintln!(
        "Loaded {} records. Type a query per line; Ctrl-D to quit.",
        snapshot.records().len()
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if tx.send(line).is_err() {
                break;
            }
        }
        Ok::<(), std::io::Error>(())
    });

    let style = HighlightStyle::default_for_tty();
    let mut debouncer = Debouncer::new(rx, Duration::from_millis(config.search.debounce_ms));
    while let Some(query) = debouncer.next().await {
        tracing::debug!(query = %query, "live query settled");
        print_results(&snapshot, &query, style);
    }

    reader.await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(rx, Duration::from_millis(200));

        for q in ["a", "al", "ali"] {
            tx.send(q.to_string()).unwrap();
        }
        drop(tx);

        assert_eq!(debouncer.next().await.as_deref(), Some("ali"));
        assert_eq!(debouncer.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_gap_yields_each() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(rx, Duration::from_millis(200));

        tx.send("first".to_string()).unwrap();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            tx.send("second".to_string()).unwrap();
        });

        assert_eq!(debouncer.next().await.as_deref(), Some("first"));
        assert_eq!(debouncer.next().await.as_deref(), Some("second"));
        assert_eq!(debouncer.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_within_window_is_superseded() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(rx, Duration::from_millis(200));

        tx.send("old".to_string()).unwrap();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            tx.send("new".to_string()).unwrap();
        });

        assert_eq!(debouncer.next().await.as_deref(), Some("new"));
        assert_eq!(debouncer.next().await, None);
    }
}

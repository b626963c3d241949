//! # Rolodex Core
//!
//! Pure, I/O-free logic for Rolodex: record models, the fuzzy matcher,
//! the search index and query engine, highlight projection, and the
//! record store abstraction.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Searching never mutates shared state, so
//! an [`Index`](index::Index) can be queried from any number of threads.
//!
//! ```text
//! records ──▶ Index::build ──▶ search(query) ──▶ MatchResult ──▶ project ──▶ Segment
//! ```

pub mod collection;
pub mod fields;
pub mod fuzzy;
pub mod highlight;
pub mod index;
pub mod models;
pub mod search;
pub mod store;
pub mod view;

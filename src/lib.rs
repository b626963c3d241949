//! # Rolodex
//!
//! A local-first personal record collection with fuzzy, typo-tolerant
//! search.
//!
//! Each record describes someone the user has met: a name, free-form
//! notes, where and when they met, and tags. Search tolerates misspellings
//! ("confrence" finds "conference"), ranks records by a weighted
//! per-field score, and reports the exact character ranges that matched so
//! every renderer can highlight them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌──────────────┐
//! │  SQLite  │──▶│ Collection  │──▶│  RecordView  │
//! │  store   │   │ Index+Fuzzy │   │  segments    │
//! └──────────┘   └─────────────┘   └──────┬───────┘
//!                                         │
//!                      ┌──────────────────┤
//!                      ▼                  ▼
//!                 ┌──────────┐      ┌───────────┐
//!                 │ terminal │      │ JSON/HTML │
//!                 │  (rdx)   │      │  render   │
//!                 └──────────┘      └───────────┘
//! ```
//!
//! The matching core lives in the `rolodex-core` crate and performs no
//! I/O. This crate adds configuration, the SQLite store, and the CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! rdx init
//! rdx add "Alice Park" --notes "met at a conference" --tags work,conference
//! rdx search confrence
//! rdx export --output backup.json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite record store |
//! | [`records`] | Add, list, show, edit, delete |
//! | [`search`] | Fuzzy search command |
//! | [`live`] | Debounced interactive search |
//! | [`export`] | JSON export and import |
//! | [`render`] | Terminal, JSON, and HTML output |

pub mod config;
pub mod db;
pub mod export;
pub mod live;
pub mod migrate;
pub mod records;
pub mod render;
pub mod search;
pub mod sqlite_store;

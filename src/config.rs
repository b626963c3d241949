//! TOML configuration for the `rdx` CLI.
//!
//! ```toml
//! [db]
//! path = "./data/rolodex.sqlite"
//!
//! [search]
//! threshold = 0.35
//! min_match_char_length = 2
//! ignore_field_norm = false
//! debounce_ms = 200
//! limit = 50
//!
//! [search.weights]
//! name = 0.5
//! notes = 0.3
//! where_met = 0.1
//! tags = 0.1
//! ```
//!
//! Only `[db].path` is required; every `[search]` key has a default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use rolodex_core::fields::{Field, SearchableField};
use rolodex_core::search::SearchParams;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_min_match_char_length")]
    pub min_match_char_length: usize,
    #[serde(default)]
    pub ignore_field_norm: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub weights: WeightsConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_match_char_length: default_min_match_char_length(),
            ignore_field_norm: false,
            debounce_ms: default_debounce_ms(),
            limit: None,
            weights: WeightsConfig::default(),
        }
    }
}

fn default_threshold() -> f64 {
    0.35
}
fn default_min_match_char_length() -> usize {
    2
}
fn default_debounce_ms() -> u64 {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeightsConfig {
    #[serde(default = "default_name_weight")]
    pub name: f64,
    #[serde(default = "default_notes_weight")]
    pub notes: f64,
    #[serde(default = "default_minor_weight")]
    pub where_met: f64,
    #[serde(default = "default_minor_weight")]
    pub tags: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            name: default_name_weight(),
            notes: default_notes_weight(),
            where_met: default_minor_weight(),
            tags: default_minor_weight(),
        }
    }
}

fn default_name_weight() -> f64 {
    0.5
}
fn default_notes_weight() -> f64 {
    0.3
}
fn default_minor_weight() -> f64 {
    0.1
}

impl SearchConfig {
    pub fn params(&self) -> SearchParams {
        SearchParams {
            threshold: self.threshold,
            min_match_char_length: self.min_match_char_length,
            ignore_field_norm: self.ignore_field_norm,
            limit: self.limit,
        }
    }

    pub fn fields(&self) -> Vec<SearchableField> {
        vec![
            SearchableField::new(Field::Name, self.weights.name),
            SearchableField::new(Field::Notes, self.weights.notes),
            SearchableField::new(Field::WhereMet, self.weights.where_met),
            SearchableField::new(Field::Tags, self.weights.tags),
        ]
    }
}

impl Config {
    /// Config rooted at a database path with default search settings.
    pub fn minimal(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig {
                path: db_path.into(),
            },
            search: SearchConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let search = &config.search;

    if !(0.0..=1.0).contains(&search.threshold) {
        anyhow::bail!("search.threshold must be in [0.0, 1.0]");
    }

    if search.min_match_char_length < 1 {
        anyhow::bail!("search.min_match_char_length must be >= 1");
    }

    if search.limit == Some(0) {
        anyhow::bail!("search.limit must be >= 1");
    }

    for (name, weight) in [
        ("name", search.weights.name),
        ("notes", search.weights.notes),
        ("where_met", search.weights.where_met),
        ("tags", search.weights.tags),
    ] {
        if !(weight > 0.0 && weight.is_finite()) {
            anyhow::bail!("search.weights.{} must be > 0", name);
        }
    }

    Ok(())
}

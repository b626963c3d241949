//! # Rolodex CLI (`rdx`)
//!
//! The `rdx` binary manages a personal record collection and searches it
//! with typo-tolerant fuzzy matching.
//!
//! ## Usage
//!
//! ```bash
//! rdx --config ./config/rdx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rdx init` | Create the SQLite database and run schema migrations |
//! | `rdx add <name>` | Add a record |
//! | `rdx list` | List all records, newest first |
//! | `rdx show <id>` | Print one record |
//! | `rdx edit <id>` | Change fields of a record |
//! | `rdx delete <id>` | Remove a record |
//! | `rdx search "<query>"` | Fuzzy search with highlighted matches |
//! | `rdx live` | Search each stdin line as it is typed |
//! | `rdx export` | Write all records as JSON |
//! | `rdx import <file>` | Load records from a JSON array |
//! | `rdx completions <shell>` | Print a shell completion script |
//!
//! Set `RUST_LOG=debug` to see index and search diagnostics on stderr.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rolodex::records::RecordInput;
use rolodex::{config, export, live, migrate, records, search};

/// Rolodex CLI: a personal record collection with fuzzy search.
///
/// All commands except `completions` read a TOML configuration file
/// given by `--config`.
#[derive(Parser)]
#[command(
    name = "rdx",
    about = "Rolodex: a local-first record collection with typo-tolerant search",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/rdx.toml`. Database and search settings are
    /// read from this file.
    #[arg(long, global = true, default_value = "./config/rdx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Default)]
struct FieldArgs {
    /// Free-form notes.
    #[arg(long)]
    notes: Option<String>,

    /// Where you met.
    #[arg(long)]
    where_met: Option<String>,

    /// When you met (YYYY-MM-DD).
    #[arg(long)]
    when_met: Option<String>,

    /// Comma-separated tags, e.g. `work,conference`.
    #[arg(long)]
    tags: Option<String>,
}

impl FieldArgs {
    fn into_input(self, name: Option<String>) -> RecordInput {
        RecordInput {
            name,
            notes: self.notes,
            where_met: self.where_met,
            when_met: self.when_met,
            tags: self.tags,
        }
    }
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it multiple times is safe.
    Init,

    /// Add a record.
    Add {
        /// Display name (required, non-empty).
        name: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// List all records, newest first.
    List {
        /// Output format: `text`, `json`, or `html`.
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print a single record.
    Show {
        /// Record id.
        id: String,
    },

    /// Change fields of an existing record.
    ///
    /// Only the given fields change. `--when-met ""` clears the date.
    Edit {
        /// Record id.
        id: String,

        /// New display name.
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a record. Unknown ids are ignored.
    Delete {
        /// Record id.
        id: String,
    },

    /// Fuzzy search across name, notes, where met, and tags.
    ///
    /// Results are ranked best first with matched characters highlighted.
    /// An empty query lists every record.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,

        /// Output format: `text`, `json`, or `html`.
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Read queries from stdin, one per line, and search as you type.
    Live,

    /// Export all records as a JSON array.
    Export {
        /// Output file path. If omitted, writes to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import records from a JSON array.
    Import {
        /// Path to the JSON file.
        file: PathBuf,

        /// Identifier policy: `merge` keeps incoming ids, `new-ids` assigns fresh ones.
        #[arg(long, default_value = "merge")]
        mode: String,
    },

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "rdx", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Add { name, fields } => {
            records::run_add(&cfg, fields.into_input(Some(name))).await?;
        }
        Commands::List { format } => {
            records::run_list(&cfg, &format).await?;
        }
        Commands::Show { id } => {
            records::run_show(&cfg, &id).await?;
        }
        Commands::Edit { id, name, fields } => {
            records::run_edit(&cfg, &id, fields.into_input(name)).await?;
        }
        Commands::Delete { id } => {
            records::run_delete(&cfg, &id).await?;
        }
        Commands::Search {
            query,
            limit,
            format,
        } => {
            search::run_search(&cfg, &query, limit, &format).await?;
        }
        Commands::Live => {
            live::run_live(&cfg).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
        Commands::Import { file, mode } => {
            export::run_import(&cfg, &file, &mode).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}

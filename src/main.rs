//! # Startup Research CLI (`srdb`)
//!
//! Command-line front end for the startup research store: schema setup,
//! ingestion of research result files, listing and lookup, statistics,
//! JSON export, LLM-backed questions, and the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! srdb [--config ./config/srdb.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `srdb init` | Create the SQLite database and table |
//! | `srdb sources` | Show the result files `ingest all` would read |
//! | `srdb ingest <file\|glob\|all>` | Parse, normalize, and store startup records |
//! | `srdb list` | Newest-first summary, with optional filters |
//! | `srdb get <id>` | Print one record |
//! | `srdb stats` | Aggregate statistics |
//! | `srdb export` | Write a timestamped JSON export |
//! | `srdb ask "<question>"` | Ask the analyst model about the data |
//! | `srdb serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use startup_research::{
    analytics, config, export, get, ingest, list, migrate, server, sources, stats,
};

/// Startup Research CLI: ingest, normalize, and query startup research data.
#[derive(Parser)]
#[command(
    name = "srdb",
    about = "Startup research database: ingest, query, export, and ask",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When omitted, `./config/srdb.toml` is used if it exists and built-in
    /// defaults otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// List the result files that `ingest all` would read.
    Sources,

    /// Ingest startup records from a result file.
    ///
    /// Tolerates prose around a JSON array. Records without a company name
    /// are skipped; a failed insert is reported and the batch continues.
    Ingest {
        /// A file path, a file-name glob (`batch_results_*.json`), or `all`
        /// for every file matching `ingest.patterns`.
        source: String,
    },

    /// List stored startups, newest first.
    List {
        /// Case-insensitive substring of the industry sector.
        #[arg(long)]
        industry: Option<String>,

        /// Exact founding year.
        #[arg(long)]
        founding_year: Option<i64>,

        /// Maximum number of records to show.
        #[arg(long, default_value_t = list::DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Print a single startup by id.
    Get {
        /// Record id.
        id: i64,
    },

    /// Show aggregate statistics.
    Stats,

    /// Export all startups as a timestamped JSON file.
    Export {
        /// Directory to write the export into.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Ask a natural-language question about the stored data.
    Ask {
        /// The question.
        question: String,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Ingest { source } => {
            ingest::run_ingest(&cfg, &source).await?;
        }
        Commands::List {
            industry,
            founding_year,
            limit,
        } => {
            let filter = list::ListFilter {
                industry,
                founding_year,
                limit: Some(limit),
            };
            list::run_list(&cfg, &filter).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, id).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
        Commands::Ask { question } => {
            analytics::run_ask(&cfg, &question).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

//! # Recall CLI (`rcl`)
//!
//! The `rcl` binary is the reference consumer of the Recall retrieval
//! engine. It provides commands for database initialization, document
//! ingestion, semantic search, context assembly, and store lifecycle.
//!
//! ## Usage
//!
//! ```bash
//! rcl --config ./config/recall.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rcl init` | Create the SQLite database and run the schema migration |
//! | `rcl add <path>` | Extract, chunk, embed, and index a document |
//! | `rcl search "<query>"` | Semantic search over indexed chunks |
//! | `rcl context "<query>"` | Assemble LLM-ready context for a question |
//! | `rcl delete <document-id>` | Remove all chunks of one document |
//! | `rcl clear` | Drop every document's chunks |
//! | `rcl stats` | Show store statistics |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use recall::config::load_config;
use recall::sqlite_store::SqliteStore;
use recall::{db, ingest, migrate, search_cmd, stats};
use recall_core::lifecycle;

/// Recall — a local-first semantic retrieval engine for document question
/// answering.
#[derive(Parser)]
#[command(
    name = "rcl",
    about = "Recall — a local-first semantic retrieval engine for document question answering",
    version,
    long_about = "Recall indexes uploaded documents (PDF or plain text) into a SQLite-backed \
    vector store, then answers questions by retrieving the most relevant passages and \
    assembling them as context for a language model."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/recall.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the chunk collection. This
    /// command is idempotent — running it multiple times is safe.
    Init,

    /// Extract, chunk, embed, and index a document.
    ///
    /// Supported formats: PDF, plain text, Markdown. Re-adding a file with
    /// the same source name replaces its previously indexed chunks.
    Add {
        /// Path of the document to index.
        path: PathBuf,

        /// Source display name; defaults to the file name.
        #[arg(long)]
        source: Option<String>,

        /// Page number recorded in chunk metadata.
        #[arg(long, default_value_t = 0)]
        page: i64,
    },

    /// Semantic search over indexed chunks.
    ///
    /// Embeds the query, retrieves the nearest chunks by cosine distance,
    /// and applies the rerank pass (duplicate suppression + relevance
    /// resort) unless disabled.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        top_k: Option<usize>,

        /// Skip the rerank pass and return raw store order.
        #[arg(long)]
        no_rerank: bool,
    },

    /// Assemble LLM-ready context for a question.
    ///
    /// Prints the formatted context block, or a fallback line when no
    /// chunk clears the relevance threshold.
    Context {
        /// The question to retrieve context for.
        query: String,

        /// Maximum number of context chunks.
        #[arg(long)]
        top_k: Option<usize>,

        /// Minimum relevance (0.0 - 1.0) a chunk must reach.
        #[arg(long)]
        min_relevance: Option<f64>,

        /// Inline each hit's preceding sibling chunk for continuity.
        #[arg(long)]
        neighbors: bool,
    },

    /// Remove all chunks of one document.
    Delete {
        /// Document id, as printed by `rcl add`.
        document_id: String,
    },

    /// Drop every document's chunks and recreate the collection.
    Clear,

    /// Show store statistics.
    Stats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Commands::Init => init(&config).await,
        Commands::Add { path, source, page } => ingest::run_add(&config, &path, source, page).await,
        Commands::Search {
            query,
            top_k,
            no_rerank,
        } => search_cmd::run_search(&config, &query, top_k, !no_rerank).await,
        Commands::Context {
            query,
            top_k,
            min_relevance,
            neighbors,
        } => search_cmd::run_context(&config, &query, top_k, min_relevance, neighbors).await,
        Commands::Delete { document_id } => delete(&config, &document_id).await,
        Commands::Clear => clear(&config).await,
        Commands::Stats => stats::run_stats(&config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn init(config: &recall::config::Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;
    pool.close().await;
    println!("initialized {}", config.db.path.display());
    Ok(())
}

async fn delete(config: &recall::config::Config, document_id: &str) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let removed = lifecycle::delete_document(&store, document_id).await;
    println!("removed {} chunks", removed);
    pool.close().await;
    Ok(())
}

async fn clear(config: &recall::config::Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    lifecycle::clear_all(&store).await;
    println!("store cleared");
    pool.close().await;
    Ok(())
}

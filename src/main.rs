//! # chai docs CLI (`chai`)
//!
//! The `chai` binary answers questions about the chai docs (HTML, Django,
//! SQL) with retrieval-augmented generation: documentation pages are
//! chunked and embedded into per-domain Qdrant collections, and questions
//! are answered by Gemini from the retrieved context.
//!
//! ## Usage
//!
//! ```bash
//! chai --config ./config/chai.toml <command>
//! ```
//!
//! The Gemini API key is read from the `GEMINI_API_KEY` environment
//! variable; a `.env` file in the working directory is honored.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `chai ingest` | Fetch, chunk, embed, and store the documentation |
//! | `chai ask "<question>"` | Answer a question from the ingested docs |
//! | `chai ask` | Interactive question loop on stdin |
//! | `chai search "<query>"` | Show raw retrieval results with scores |
//! | `chai status` | Show collection status and point counts |
//!
//! ## Examples
//!
//! ```bash
//! # Ingest all three documentation domains
//! chai ingest
//!
//! # Re-ingest only the Django docs into a fresh collection
//! chai ingest --domain django --recreate
//!
//! # One-shot question
//! chai ask "what is a foreign key?"
//!
//! # Inspect what retrieval returns for a query
//! chai search "jinja templates" --domain django
//! ```

mod ask;
mod chunk;
mod config;
mod fetch;
mod gemini;
mod ingest;
mod models;
mod prompt;
mod qdrant;
mod search;
mod status;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Question answering over the chai docs.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/chai.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "chai",
    about = "Retrieval-augmented Q&A over the chai docs (HTML, Django, SQL)",
    version,
    long_about = "chai ingests the chai documentation (HTML, Django, SQL) into per-domain \
    Qdrant collections using Gemini embeddings, and answers questions by retrieving the \
    closest chunks from every collection and prompting the chat model with labeled context."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When omitted, `./config/chai.toml` is used if present, otherwise the
    /// built-in defaults (the chai docs domains). An explicitly given path
    /// must exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Fetch, chunk, embed, and store the documentation.
    ///
    /// Walks every configured URL, extracts the page text, splits it into
    /// overlapping chunks, embeds them with Gemini, and upserts the
    /// vectors into the domain's Qdrant collection. Individual page
    /// failures are reported and skipped; the run fails only when every
    /// URL failed.
    Ingest {
        /// Restrict the run to one domain (e.g. `html`, `django`, `sql`).
        #[arg(long)]
        domain: Option<String>,

        /// Fetch and chunk without touching Qdrant or the embedding API.
        #[arg(long)]
        dry_run: bool,

        /// Drop each collection before writing, discarding stale points.
        #[arg(long)]
        recreate: bool,
    },

    /// Ask a question and get a grounded answer.
    ///
    /// Retrieves matching chunks from every domain, builds a labeled
    /// context prompt, and asks the chat model. The answer is printed
    /// together with the most relevant source URL.
    Ask {
        /// The question. Omit to read questions line by line from stdin.
        question: Option<String>,
    },

    /// Show raw retrieval results without generating an answer.
    ///
    /// Embeds the query once and prints the top chunks per domain with
    /// their similarity scores. Useful for checking what the `ask`
    /// prompt would be built from.
    Search {
        /// The search query string.
        query: String,

        /// Restrict the search to one domain.
        #[arg(long)]
        domain: Option<String>,

        /// Results per collection (defaults to `search.top_k` from config).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show collection status and point counts.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest {
            domain,
            dry_run,
            recreate,
        } => {
            ingest::run_ingest(&cfg, domain.as_deref(), dry_run, recreate).await?;
        }
        Commands::Ask { question } => {
            ask::run_ask(&cfg, question).await?;
        }
        Commands::Search {
            query,
            domain,
            limit,
        } => {
            search::run_search(&cfg, &query, domain.as_deref(), limit).await?;
        }
        Commands::Status => {
            status::run_status(&cfg).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so reports and answers on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

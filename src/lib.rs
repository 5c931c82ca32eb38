//! # chaidocs-rag
//!
//! Retrieval-augmented question answering over the chai docs.
//!
//! Documentation pages (HTML, Django, SQL) are fetched, reduced to plain
//! text, split into overlapping chunks, embedded with Gemini, and stored
//! in one Qdrant collection per domain. Questions are answered by
//! retrieving the closest chunks from every collection and prompting the
//! chat model with labeled per-domain context.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌──────────────┐
//! │  Fetch   │──▶│ Chunk + Embed │──▶│    Qdrant    │
//! │ chaidocs │   │    Gemini     │   │ 3 collections│
//! └──────────┘   └───────────────┘   └──────┬───────┘
//!                                           │
//!                       ┌───────────────────┤
//!                       ▼                   ▼
//!                 ┌──────────┐       ┌──────────┐
//!                 │   ask    │       │  search  │
//!                 │  Gemini  │       │  scores  │
//!                 └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! chai ingest                  # fetch + embed all three domains
//! chai ask "what is a join?"   # one-shot answer with source
//! chai ask                     # interactive loop
//! chai search "flexbox"        # raw retrieval scores
//! chai status                  # collection health
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and the built-in domains |
//! | [`models`] | Core data types |
//! | [`fetch`] | Page fetching and HTML-to-text extraction |
//! | [`chunk`] | Recursive character text splitting |
//! | [`gemini`] | Gemini embeddings and answer generation |
//! | [`qdrant`] | Qdrant collections, upserts, and search |
//! | [`ingest`] | Ingestion pipeline orchestration |
//! | [`search`] | Cross-collection retrieval and source ranking |
//! | [`prompt`] | Labeled-context prompt assembly |
//! | [`ask`] | Question answering and the interactive loop |
//! | [`status`] | Collection status report |

pub mod ask;
pub mod chunk;
pub mod config;
pub mod fetch;
pub mod gemini;
pub mod ingest;
pub mod models;
pub mod prompt;
pub mod qdrant;
pub mod search;
pub mod status;

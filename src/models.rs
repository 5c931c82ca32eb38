//! Core data models used throughout the pipeline.
//!
//! These types represent the documentation pages, chunks, and search results
//! that flow through ingestion and retrieval.

/// A fetched documentation page, reduced to plain text.
#[derive(Debug, Clone)]
pub struct Document {
    /// The URL the page was fetched from.
    pub source: String,
    /// Extracted text content.
    pub body: String,
}

/// A slice of a document's body text, bounded by the chunking policy.
///
/// Chunks inherit the parent document's `source` so that every stored
/// vector can be traced back to the page it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub source: String,
    pub chunk_index: usize,
    pub text: String,
}

/// A chunk returned from a similarity search, with its score.
///
/// `source` is optional because the store does not guarantee payloads;
/// points written by this tool always carry one.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub text: String,
    pub source: Option<String>,
    pub score: f32,
}

/// The retrieval result for one documentation domain.
#[derive(Debug, Clone)]
pub struct DomainMatches {
    /// Display label used in prompts and reports (e.g. `HTML`).
    pub label: String,
    pub hits: Vec<ScoredChunk>,
}

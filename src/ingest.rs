//! Ingestion pipeline orchestration.
//!
//! Coordinates the full flow per domain: fetch pages → extract text →
//! chunk → embed → upsert into the domain's collection. Individual page
//! failures are reported and skipped; the run only fails when every URL
//! failed.

use anyhow::Result;

use crate::chunk::TextSplitter;
use crate::config::Config;
use crate::fetch::PageFetcher;
use crate::gemini::GeminiClient;
use crate::models::Chunk;
use crate::qdrant::QdrantStore;

pub async fn run_ingest(
    config: &Config,
    domain: Option<&str>,
    dry_run: bool,
    recreate: bool,
) -> Result<()> {
    let domains = config.select_domains(domain)?;

    // Key check happens before any fetching, dry run included.
    let gemini = GeminiClient::from_env(&config.gemini)?;
    let fetcher = PageFetcher::new(&config.fetch)?;
    let store = QdrantStore::new(&config.qdrant)?;
    let splitter = TextSplitter::new(config.chunking.chunk_size, config.chunking.chunk_overlap);

    let mut total_urls = 0usize;
    let mut failures: Vec<(String, String)> = Vec::new();

    for domain in &domains {
        if dry_run {
            println!("ingest {} (dry-run)", domain.name);
        } else {
            println!("ingest {}", domain.name);
        }

        if !dry_run {
            if recreate {
                store.delete_collection(&domain.collection).await?;
            }
            store
                .ensure_collection(&domain.collection, config.gemini.dims)
                .await?;
        }

        let mut pages = 0usize;
        let mut chunk_count = 0usize;
        let mut points = 0usize;
        let mut failed = 0usize;

        for url in &domain.urls {
            total_urls += 1;

            let doc = match fetcher.fetch(url).await {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!("fetch failed for {url}: {e:#}");
                    failures.push((url.clone(), format!("{e:#}")));
                    failed += 1;
                    continue;
                }
            };

            let chunks = splitter.split_document(&doc);
            pages += 1;
            chunk_count += chunks.len();

            if dry_run || chunks.is_empty() {
                continue;
            }

            let written = embed_and_upsert(
                &gemini,
                &store,
                &domain.collection,
                &chunks,
                config.gemini.batch_size,
            )
            .await;
            match written {
                Ok(written) => points += written,
                Err(e) => {
                    tracing::warn!("ingest failed for {url}: {e:#}");
                    failures.push((url.clone(), format!("{e:#}")));
                    failed += 1;
                }
            }
        }

        println!("  fetched: {} pages", pages);
        if dry_run {
            println!("  estimated chunks: {}", chunk_count);
        } else {
            println!("  chunks: {}", chunk_count);
            println!("  points upserted: {}", points);
        }
        if failed > 0 {
            println!("  failed: {}", failed);
        }
    }

    if !failures.is_empty() {
        println!("failures:");
        for (url, err) in &failures {
            println!("  {}: {}", url, err);
        }
        if failures.len() == total_urls && total_urls > 0 {
            anyhow::bail!("All {} URLs failed to ingest", total_urls);
        }
    }

    println!("ok");
    Ok(())
}

/// Embed chunks in batches and upsert them with their vectors.
async fn embed_and_upsert(
    gemini: &GeminiClient,
    store: &QdrantStore,
    collection: &str,
    chunks: &[Chunk],
    batch_size: usize,
) -> Result<usize> {
    let mut written = 0usize;
    for batch in chunks.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = gemini.embed_batch(&texts).await?;
        written += store.upsert_chunks(collection, batch, &vectors).await?;
    }
    Ok(written)
}

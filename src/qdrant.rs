//! Qdrant vector store client.
//!
//! Talks to the Qdrant REST API: one collection per documentation domain,
//! cosine distance, chunk text and provenance carried in the point
//! payload. No retry layer; the store is expected to be local.

use std::time::Duration;

use anyhow::{anyhow, ensure, Context, Result};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::QdrantConfig;
use crate::models::{Chunk, ScoredChunk};

pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
}

impl QdrantStore {
    pub fn new(config: &QdrantConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn collection_exists(&self, name: &str) -> Result<bool> {
        let url = format!("{}/collections/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let detail = response.text().await.unwrap_or_default();
        anyhow::bail!("Qdrant collection check failed with {status}: {detail}")
    }

    /// Create the collection if it does not exist yet.
    pub async fn ensure_collection(&self, name: &str, dims: usize) -> Result<()> {
        if self.collection_exists(name).await? {
            return Ok(());
        }

        let url = format!("{}/collections/{}", self.base_url, name);
        let body = json!({ "vectors": { "size": dims, "distance": "Cosine" } });
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;
        read_response(response, "collection create").await?;
        Ok(())
    }

    /// Drop a collection. Deleting a collection that does not exist is
    /// not an error.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        let url = format!("{}/collections/{}", self.base_url, name);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        let detail = response.text().await.unwrap_or_default();
        anyhow::bail!("Qdrant collection delete failed with {status}: {detail}")
    }

    /// Upsert chunks with their embedding vectors. Returns the number of
    /// points written.
    pub async fn upsert_chunks(
        &self,
        collection: &str,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<usize> {
        ensure!(
            chunks.len() == vectors.len(),
            "got {} vectors for {} chunks",
            vectors.len(),
            chunks.len()
        );
        if chunks.is_empty() {
            return Ok(0);
        }

        let points: Vec<Value> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                json!({
                    "id": point_id(collection, chunk),
                    "vector": vector,
                    "payload": {
                        "text": chunk.text,
                        "source": chunk.source,
                        "chunk_index": chunk.chunk_index,
                    },
                })
            })
            .collect();

        let url = format!("{}/collections/{}/points?wait=true", self.base_url, collection);
        let response = self
            .client
            .put(&url)
            .json(&json!({ "points": points }))
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;
        read_response(response, "upsert").await?;
        Ok(chunks.len())
    }

    /// Nearest-neighbor search. Scores are cosine similarities, so higher
    /// means closer.
    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let url = format!("{}/collections/{}/points/search", self.base_url, collection);
        let body = json!({ "vector": vector, "limit": limit, "with_payload": true });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;
        let value = read_response(response, "search").await?;
        parse_search_response(&value)
    }

    pub async fn count(&self, collection: &str) -> Result<u64> {
        let url = format!("{}/collections/{}/points/count", self.base_url, collection);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "exact": true }))
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;
        let value = read_response(response, "count").await?;
        value
            .get("result")
            .and_then(|r| r.get("count"))
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow!("Qdrant count response missing 'result.count'"))
    }
}

async fn read_response(response: reqwest::Response, action: &str) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        anyhow::bail!("Qdrant {action} failed with {status}: {detail}");
    }
    response
        .json::<Value>()
        .await
        .with_context(|| format!("Failed to decode Qdrant {action} response"))
}

fn parse_search_response(response: &Value) -> Result<Vec<ScoredChunk>> {
    let hits = response
        .get("result")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("Qdrant search response missing 'result'"))?;

    let mut results = Vec::with_capacity(hits.len());
    for hit in hits {
        let score = hit
            .get("score")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| anyhow!("Qdrant search hit missing 'score'"))? as f32;
        let payload = hit.get("payload");
        let text = payload
            .and_then(|p| p.get("text"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let source = payload
            .and_then(|p| p.get("source"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        results.push(ScoredChunk {
            text,
            source,
            score,
        });
    }
    Ok(results)
}

/// Content-addressed point ID: the same collection, source, position and
/// text always hash to the same UUID, so re-ingesting an unchanged page
/// overwrites its points in place instead of accumulating duplicates.
pub fn point_id(collection: &str, chunk: &Chunk) -> String {
    let mut hasher = Sha256::new();
    hasher.update(collection.as_bytes());
    hasher.update(chunk.source.as_bytes());
    hasher.update((chunk.chunk_index as u64).to_le_bytes());
    hasher.update(chunk.text.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes).to_string()
}

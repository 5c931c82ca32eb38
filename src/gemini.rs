//! Gemini REST client for embeddings and answer generation.
//!
//! Talks to the `v1beta` API directly: `batchEmbedContents` for document
//! and query vectors, `generateContent` for answers. The API key comes
//! from the `GEMINI_API_KEY` environment variable and is checked before
//! any network call is made.

use std::time::Duration;

use anyhow::{anyhow, ensure, Context, Result};
use serde_json::{json, Value};

use crate::config::GeminiConfig;

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    embed_model: String,
    chat_model: String,
    temperature: f32,
    max_retries: u32,
}

impl GeminiClient {
    /// Build a client using the `GEMINI_API_KEY` environment variable.
    pub fn from_env(config: &GeminiConfig) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            anyhow::bail!("GEMINI_API_KEY environment variable not set");
        }
        Self::new(config, api_key)
    }

    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            embed_model: qualify_model(&config.embed_model),
            chat_model: qualify_model(&config.chat_model),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }

    /// Embed a batch of texts, one vector per input, in input order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let requests: Vec<Value> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": self.embed_model,
                    "content": { "parts": [{ "text": text }] },
                })
            })
            .collect();

        let url = format!(
            "{}/v1beta/{}:batchEmbedContents",
            self.base_url, self.embed_model
        );
        let response = self
            .post_with_retry(&url, &json!({ "requests": requests }))
            .await?;

        parse_embeddings(&response, texts.len())
    }

    /// Embed a single query string.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Gemini returned no embedding for the query"))
    }

    /// Generate an answer for a fully rendered prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
        });

        let url = format!("{}/v1beta/{}:generateContent", self.base_url, self.chat_model);
        let response = self.post_with_retry(&url, &body).await?;

        parse_generation(&response)
    }

    /// POST with retries on 429, 5xx, and transport errors. Other error
    /// statuses fail immediately.
    async fn post_with_retry(&self, url: &str, body: &Value) -> Result<Value> {
        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(backoff).await;
            }

            let result = self
                .client
                .post(url)
                .header("x-goog-api-key", &self.api_key)
                .json(body)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<Value>()
                            .await
                            .context("Failed to decode Gemini response");
                    }
                    let detail = response.text().await.unwrap_or_default();
                    let err = anyhow!("Gemini request failed with {status}: {detail}");
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    last_err = Some(anyhow::Error::from(e).context("Gemini request failed"));
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("Gemini request failed")))
    }
}

/// Model names in API paths are written `models/<name>`; accept both the
/// short and the qualified form in config.
fn qualify_model(name: &str) -> String {
    if name.starts_with("models/") {
        name.to_string()
    } else {
        format!("models/{name}")
    }
}

fn parse_embeddings(response: &Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    let embeddings = response
        .get("embeddings")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("Gemini response missing 'embeddings'"))?;

    let mut vectors = Vec::with_capacity(embeddings.len());
    for entry in embeddings {
        let values = entry
            .get("values")
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("Gemini embedding missing 'values'"))?;
        let vector: Vec<f32> = values
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as f32)
            .collect();
        vectors.push(vector);
    }

    ensure!(
        vectors.len() == expected,
        "Gemini returned {} embeddings for {} inputs",
        vectors.len(),
        expected
    );
    Ok(vectors)
}

fn parse_generation(response: &Value) -> Result<String> {
    let parts = response
        .get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    ensure!(
        !text.trim().is_empty(),
        "Gemini response contained no text"
    );
    Ok(text)
}

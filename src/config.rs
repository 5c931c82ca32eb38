use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/chai.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default = "default_domains")]
    pub domains: Vec<DomainConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant: QdrantConfig::default(),
            gemini: GeminiConfig::default(),
            chunking: ChunkingConfig::default(),
            fetch: FetchConfig::default(),
            search: SearchConfig::default(),
            domains: default_domains(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QdrantConfig {
    #[serde(default = "default_qdrant_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: default_qdrant_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_qdrant_url() -> String {
    "http://localhost:6333".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Embedding vector dimensionality; collections are created with this size.
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            embed_model: default_embed_model(),
            chat_model: default_chat_model(),
            dims: default_dims(),
            temperature: default_temperature(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_embed_model() -> String {
    "models/embedding-001".to_string()
}
fn default_chat_model() -> String {
    "gemini-2.0-flash-001".to_string()
}
fn default_dims() -> usize {
    768
}
fn default_temperature() -> f32 {
    0.2
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    // The docs site serves an empty shell to unknown agents.
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/123.0.0.0 Safari/537.36".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Results requested per collection.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

/// One documentation domain: a named collection plus the pages that feed it.
#[derive(Debug, Deserialize, Clone)]
pub struct DomainConfig {
    pub name: String,
    pub collection: String,
    /// Display label used in prompts and reports.
    pub label: String,
    pub urls: Vec<String>,
}

fn default_domains() -> Vec<DomainConfig> {
    vec![
        DomainConfig {
            name: "html".to_string(),
            collection: "html_docs".to_string(),
            label: "HTML".to_string(),
            urls: vec![
                "https://chaidocs.vercel.app/youtube/chai-aur-html/introduction/".to_string(),
                "https://chaidocs.vercel.app/youtube/chai-aur-html/emmit-crash-course/".to_string(),
                "https://chaidocs.vercel.app/youtube/chai-aur-html/html-tags/".to_string(),
            ],
        },
        DomainConfig {
            name: "django".to_string(),
            collection: "django_docs".to_string(),
            label: "Django".to_string(),
            urls: vec![
                "https://chaidocs.vercel.app/youtube/chai-aur-django/getting-started/".to_string(),
                "https://chaidocs.vercel.app/youtube/chai-aur-django/jinja-templates/".to_string(),
                "https://chaidocs.vercel.app/youtube/chai-aur-django/tailwind/".to_string(),
                "https://chaidocs.vercel.app/youtube/chai-aur-django/models/".to_string(),
                "https://chaidocs.vercel.app/youtube/chai-aur-django/relationships-and-forms/"
                    .to_string(),
            ],
        },
        DomainConfig {
            name: "sql".to_string(),
            collection: "sql_docs".to_string(),
            label: "SQL".to_string(),
            urls: vec![
                "https://chaidocs.vercel.app/youtube/chai-aur-sql/postgres/".to_string(),
                "https://chaidocs.vercel.app/youtube/chai-aur-sql/normalization/".to_string(),
                "https://chaidocs.vercel.app/youtube/chai-aur-sql/database-design-exercise/"
                    .to_string(),
                "https://chaidocs.vercel.app/youtube/chai-aur-sql/joins-and-keys/".to_string(),
            ],
        },
    ]
}

impl Config {
    /// Resolve a `--domain` filter against the configured domains.
    ///
    /// `None` selects every domain; an unknown name is an error listing
    /// what is available.
    pub fn select_domains(&self, name: Option<&str>) -> Result<Vec<&DomainConfig>> {
        match name {
            None => Ok(self.domains.iter().collect()),
            Some(wanted) => {
                let found = self.domains.iter().find(|d| d.name == wanted);
                match found {
                    Some(domain) => Ok(vec![domain]),
                    None => {
                        let names: Vec<&str> =
                            self.domains.iter().map(|d| d.name.as_str()).collect();
                        anyhow::bail!(
                            "Unknown domain: '{}'. Available: {}",
                            wanted,
                            names.join(", ")
                        )
                    }
                }
            }
        }
    }
}

/// Load configuration from `path`, or fall back to the built-in defaults.
///
/// An explicitly given path must exist; the default path
/// (`./config/chai.toml`) is optional because the built-in configuration
/// already describes the chai docs domains.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if !path.exists() {
        if explicit {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return validate(Config::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(config)
}

fn validate(config: Config) -> Result<Config> {
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }

    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!(
            "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
            config.chunking.chunk_overlap,
            config.chunking.chunk_size
        );
    }

    if config.search.top_k == 0 {
        anyhow::bail!("search.top_k must be >= 1");
    }

    if config.gemini.dims == 0 {
        anyhow::bail!("gemini.dims must be > 0");
    }

    if !(0.0..=2.0).contains(&config.gemini.temperature) {
        anyhow::bail!("gemini.temperature must be in [0.0, 2.0]");
    }

    if config.gemini.batch_size == 0 {
        anyhow::bail!("gemini.batch_size must be > 0");
    }

    if config.domains.is_empty() {
        anyhow::bail!("at least one [[domains]] entry is required");
    }

    let mut seen = std::collections::HashSet::new();
    for domain in &config.domains {
        if domain.name.is_empty() || domain.collection.is_empty() || domain.label.is_empty() {
            anyhow::bail!("domains entries need non-empty name, collection, and label");
        }
        if !seen.insert(domain.collection.as_str()) {
            anyhow::bail!("duplicate collection name: '{}'", domain.collection);
        }
        if domain.urls.is_empty() {
            anyhow::bail!("domain '{}' has no urls", domain.name);
        }
        for url in &domain.urls {
            url::Url::parse(url)
                .with_context(|| format!("domain '{}' has an invalid url: {}", domain.name, url))?;
        }
    }

    Ok(config)
}

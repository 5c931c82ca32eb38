//! Retrieval across the documentation collections.

use anyhow::Result;
use futures_util::future::join_all;

use crate::config::{Config, DomainConfig};
use crate::gemini::GeminiClient;
use crate::models::DomainMatches;
use crate::qdrant::QdrantStore;

/// Embed the query once and search every selected collection
/// concurrently.
///
/// A failed search logs a warning and contributes no hits; a query never
/// fails outright because one collection is missing or unreachable.
pub async fn retrieve_all(
    gemini: &GeminiClient,
    store: &QdrantStore,
    domains: &[&DomainConfig],
    query: &str,
    top_k: usize,
) -> Result<Vec<DomainMatches>> {
    let query_vec = gemini.embed_query(query).await?;
    let query_vec = &query_vec;

    let searches = domains.iter().map(|domain| async move {
        let hits = match store.search(&domain.collection, query_vec, top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("search in '{}' failed: {e:#}", domain.collection);
                Vec::new()
            }
        };
        DomainMatches {
            label: domain.label.clone(),
            hits,
        }
    });

    Ok(join_all(searches).await)
}

/// Pool every hit that carries a source URL and return the best one.
///
/// Qdrant cosine scores are similarities, so the pool is sorted
/// descending. The sort is stable; on equal scores the hit from the
/// earlier domain wins.
pub fn best_source(domains: &[DomainMatches]) -> Option<(String, f32)> {
    let mut pool: Vec<(&str, f32)> = domains
        .iter()
        .flat_map(|domain| domain.hits.iter())
        .filter_map(|hit| hit.source.as_deref().map(|source| (source, hit.score)))
        .collect();

    pool.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    pool.first().map(|(source, score)| (source.to_string(), *score))
}

/// `chai search`: print the top chunks per domain without calling the
/// chat model.
pub async fn run_search(
    config: &Config,
    query: &str,
    domain: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let domains = config.select_domains(domain)?;
    let top_k = limit.unwrap_or(config.search.top_k);

    let gemini = GeminiClient::from_env(&config.gemini)?;
    let store = QdrantStore::new(&config.qdrant)?;

    let results = retrieve_all(&gemini, &store, &domains, query, top_k).await?;

    for (domain, matches) in domains.iter().zip(&results) {
        println!("{} ({}):", matches.label, domain.collection);
        if matches.hits.is_empty() {
            println!("  (no results)");
            println!();
            continue;
        }
        for (i, hit) in matches.hits.iter().enumerate() {
            let source = hit.source.as_deref().unwrap_or("(unknown source)");
            println!("{}. [{:.4}] {}", i + 1, hit.score, source);
            println!("   excerpt: \"{}\"", excerpt(&hit.text, 160));
        }
        println!();
    }
    Ok(())
}

/// Flatten a chunk to a single display line, truncated on a character
/// boundary.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= max_chars {
        return flat.to_string();
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoredChunk;

    fn domain_with(name: &str, label: &str, hits: Vec<(Option<&str>, f32)>) -> DomainMatches {
        DomainMatches {
            label: label.to_string(),
            hits: hits
                .into_iter()
                .map(|(source, score)| ScoredChunk {
                    text: format!("chunk from {name}"),
                    source: source.map(|s| s.to_string()),
                    score,
                })
                .collect(),
        }
    }

    #[test]
    fn test_best_source_prefers_highest_score() {
        let domains = vec![
            domain_with("html", "HTML", vec![(Some("https://a/"), 0.9)]),
            domain_with("django", "Django", vec![(Some("https://b/"), 0.95)]),
            domain_with("sql", "SQL", vec![(Some("https://c/"), 0.7)]),
        ];
        let (source, score) = best_source(&domains).unwrap();
        assert_eq!(source, "https://b/");
        assert!((score - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_best_source_tie_goes_to_earlier_domain() {
        let domains = vec![
            domain_with("html", "HTML", vec![(Some("https://first/"), 0.8)]),
            domain_with("django", "Django", vec![(Some("https://second/"), 0.8)]),
        ];
        let (source, _) = best_source(&domains).unwrap();
        assert_eq!(source, "https://first/");
    }

    #[test]
    fn test_best_source_skips_hits_without_source() {
        let domains = vec![domain_with(
            "html",
            "HTML",
            vec![(None, 0.99), (Some("https://tagged/"), 0.5)],
        )];
        let (source, score) = best_source(&domains).unwrap();
        assert_eq!(source, "https://tagged/");
        assert!((score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_best_source_empty() {
        assert!(best_source(&[]).is_none());
        let domains = vec![domain_with("html", "HTML", vec![(None, 0.9)])];
        assert!(best_source(&domains).is_none());
    }

    #[test]
    fn test_excerpt_flattens_and_truncates() {
        assert_eq!(excerpt("short\ntext", 160), "short text");
        let long = "x".repeat(200);
        let cut = excerpt(&long, 160);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 163);
    }
}

//! Store health overview.
//!
//! Shows which collections exist in Qdrant and how many points each one
//! holds, so ingestion can be confirmed before asking questions. Always
//! exits zero; an unreachable store is reported, not fatal.

use anyhow::Result;

use crate::config::Config;
use crate::qdrant::QdrantStore;

pub async fn run_status(config: &Config) -> Result<()> {
    let store = QdrantStore::new(&config.qdrant)?;

    println!("Qdrant store status");
    println!("===================");
    println!();
    println!("  Qdrant:  {}", config.qdrant.url);
    println!();
    println!(
        "  {:<10} {:<16} {:>8}   {}",
        "DOMAIN", "COLLECTION", "POINTS", "STATE"
    );
    println!("  {}", "-".repeat(52));

    for domain in &config.domains {
        let (points, state) = match store.collection_exists(&domain.collection).await {
            Ok(true) => match store.count(&domain.collection).await {
                Ok(count) => (count.to_string(), "ready".to_string()),
                Err(e) => ("?".to_string(), format!("error: {e:#}")),
            },
            Ok(false) => ("-".to_string(), "missing".to_string()),
            Err(e) => {
                tracing::warn!("cannot reach Qdrant for '{}': {e:#}", domain.collection);
                ("-".to_string(), "unreachable".to_string())
            }
        };
        println!(
            "  {:<10} {:<16} {:>8}   {}",
            domain.name, domain.collection, points, state
        );
    }

    println!();
    Ok(())
}

//! CLI entry points for `rcl search` and `rcl context`.
//!
//! The retrieval algorithms live in `recall-core` and operate through the
//! store and embedder traits; these wrappers handle config, database
//! connection, and stdout formatting. Both commands sit on the read path:
//! collaborator failures degrade to "no results" rather than a hard error,
//! so a failed question never aborts the surrounding conversation.

use anyhow::Result;

use recall_core::context::{build_context, build_expanded_context};
use recall_core::search::search;

use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::sqlite_store::SqliteStore;

pub async fn run_search(
    config: &Config,
    query: &str,
    top_k: Option<usize>,
    rerank: bool,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let embedder = embedding::create_embedder(&config.embedding)?;

    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let results = search(&store, embedder.as_ref(), query, top_k, rerank).await;

    if results.is_empty() {
        println!("No results.");
        pool.close().await;
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. [{:.3}] {} (page {}, chunk {})",
            i + 1,
            result.relevance,
            result.source,
            result.page,
            result.chunk_num
        );
        let excerpt: String = result.text.chars().take(240).collect();
        println!("    excerpt: \"{}\"", excerpt.replace('\n', " ").trim());
        println!("    id: {}", result.id);
        println!();
    }

    pool.close().await;
    Ok(())
}

pub async fn run_context(
    config: &Config,
    query: &str,
    top_k: Option<usize>,
    min_relevance: Option<f64>,
    neighbors: bool,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let embedder = embedding::create_embedder(&config.embedding)?;

    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let include_neighbors = neighbors || config.retrieval.include_neighbors;

    let context = if include_neighbors {
        build_expanded_context(&store, embedder.as_ref(), query, top_k, true).await
    } else {
        let min_relevance = min_relevance.unwrap_or(config.retrieval.min_relevance);
        build_context(&store, embedder.as_ref(), query, top_k, min_relevance).await
    };

    if context.is_empty() {
        // Callers fall back to no-context prompting; this is not an error.
        println!("No relevant context found.");
    } else {
        println!("{}", context);
    }

    pool.close().await;
    Ok(())
}

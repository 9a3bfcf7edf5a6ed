//! Semantic search with reranking and duplicate suppression.
//!
//! The search algorithm operates entirely through the [`VectorStore`] and
//! [`Embedder`] traits:
//!
//! 1. Normalize the query exactly as indexed text is normalized.
//! 2. Over-fetch: `top_k * 2` candidates when reranking (compensates for
//!    dedup shrinkage), `top_k` otherwise.
//! 3. Embed the query and ask the store for the nearest candidates,
//!    ordered ascending by cosine distance.
//! 4. Map each candidate to a [`SearchResult`] with
//!    `relevance = 1 - distance` and its 1-based pre-rerank `rank`.
//! 5. When reranking: drop candidates whose first 100 characters hash the
//!    same as an earlier one (overlapping windows produce near-duplicates),
//!    stable-sort descending by relevance, truncate to `top_k`.
//!
//! This is the read path: any embedding or store failure degrades to an
//! empty result set with a logged warning. A failed question must never
//! abort the caller's conversation flow; callers surface an empty result as
//! "no relevant context found".

use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, warn};

use crate::chunk::{normalize_text, short_hash};
use crate::embedding::{embed_query, Embedder};
use crate::models::SearchResult;
use crate::store::VectorStore;

/// Run a semantic search, returning at most `top_k` results.
///
/// Collaborator failures are recovered internally to an empty vector.
pub async fn search<S, E>(
    store: &S,
    embedder: &E,
    query: &str,
    top_k: usize,
    rerank: bool,
) -> Vec<SearchResult>
where
    S: VectorStore + ?Sized,
    E: Embedder + ?Sized,
{
    match try_search(store, embedder, query, top_k, rerank).await {
        Ok(results) => results,
        Err(err) => {
            warn!(error = %err, "search degraded to empty results");
            Vec::new()
        }
    }
}

async fn try_search<S, E>(
    store: &S,
    embedder: &E,
    query: &str,
    top_k: usize,
    rerank: bool,
) -> Result<Vec<SearchResult>>
where
    S: VectorStore + ?Sized,
    E: Embedder + ?Sized,
{
    let query = normalize_text(query);
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let fetch_k = if rerank { top_k * 2 } else { top_k };
    let query_vec = embed_query(embedder, &query).await?;
    let hits = store.query(&query_vec, fetch_k).await?;

    let results: Vec<SearchResult> = hits
        .into_iter()
        .enumerate()
        .map(|(i, hit)| SearchResult {
            relevance: 1.0 - hit.distance,
            distance: hit.distance,
            source: hit.metadata.source.clone(),
            page: hit.metadata.page,
            chunk_num: hit.metadata.chunk_num,
            document_id: hit.metadata.document_id.clone(),
            rank: i + 1,
            id: hit.id,
            text: hit.text,
        })
        .collect();

    debug!(query = %query, candidates = results.len(), rerank, "search");

    if !rerank {
        let mut results = results;
        results.truncate(top_k);
        return Ok(results);
    }

    Ok(rerank_results(results, top_k))
}

/// Dedup + relevance-resort + truncate pass over over-fetched candidates.
///
/// Duplicates are detected by hashing the first 100 characters of each
/// result's text; only the first occurrence survives, in store order.
/// The sort is stable, so ties keep their original order.
pub fn rerank_results(results: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<SearchResult> = results
        .into_iter()
        .filter(|r| {
            let prefix: String = r.text.chars().take(100).collect();
            seen.insert(short_hash(&prefix))
        })
        .collect();

    unique.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    unique.truncate(top_k);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChunkMetadata, ChunkRecord};
    use crate::store::memory::InMemoryStore;
    use crate::testing::{FailingEmbedder, FailingStore, MockEmbedder};

    fn record(id: &str, text: &str, chunk_num: i64, vector: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            text: text.to_string(),
            vector,
            metadata: ChunkMetadata {
                document_id: "d1".to_string(),
                source: "paper.pdf".to_string(),
                page: 0,
                chunk_num,
                model: "mock-embedder".to_string(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
                extra: serde_json::json!({}),
            },
        }
    }

    fn result(id: &str, text: &str, relevance: f64, rank: usize) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            text: text.to_string(),
            distance: 1.0 - relevance,
            relevance,
            source: "paper.pdf".to_string(),
            page: 0,
            chunk_num: 0,
            document_id: "d1".to_string(),
            rank,
        }
    }

    async fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .upsert(&[
                record("d1_0", "cats purr when content", 0, vec![1.0, 0.0]),
                record("d1_1", "dogs bark at strangers", 1, vec![0.7, 0.7]),
                record("d1_2", "fish swim in schools", 2, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_relevance_is_one_minus_distance() {
        let store = seeded_store().await;
        let embedder = MockEmbedder::new(2).pin("cats", vec![1.0, 0.0]);

        let results = search(&store, &embedder, "cats", 3, false).await;
        assert_eq!(results.len(), 3);
        for r in &results {
            assert!(r.distance >= 0.0);
            assert!((r.relevance - (1.0 - r.distance)).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_ranks_follow_store_order_and_relevance_decreases() {
        let store = seeded_store().await;
        let embedder = MockEmbedder::new(2).pin("cats", vec![1.0, 0.0]);

        let results = search(&store, &embedder, "cats", 3, false).await;
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.rank, i + 1);
        }
        for pair in results.windows(2) {
            assert!(pair[0].relevance >= pair[1].relevance);
        }
        assert_eq!(results[0].id, "d1_0");
    }

    #[tokio::test]
    async fn test_no_rerank_truncates_to_top_k_unchanged() {
        let store = seeded_store().await;
        let embedder = MockEmbedder::new(2).pin("cats", vec![1.0, 0.0]);

        let results = search(&store, &embedder, "cats", 2, false).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "d1_0");
        assert_eq!(results[1].id, "d1_1");
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_not_error() {
        let store = InMemoryStore::new();
        let embedder = MockEmbedder::new(2);
        let results = search(&store, &embedder, "unrelated query", 3, true).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_embedder_failure_degrades_to_empty() {
        let store = seeded_store().await;
        let results = search(&store, &FailingEmbedder, "cats", 3, true).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_empty() {
        let embedder = MockEmbedder::new(2);
        let results = search(&FailingStore, &embedder, "cats", 3, true).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_returns_empty() {
        let store = seeded_store().await;
        let embedder = MockEmbedder::new(2);
        let results = search(&store, &embedder, "   ", 3, true).await;
        assert!(results.is_empty());
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_rerank_suppresses_near_duplicates() {
        let store = InMemoryStore::new();
        let shared: String = "x".repeat(100);
        store
            .upsert(&[
                record("d1_0", &format!("{} tail one", shared), 0, vec![1.0, 0.0]),
                record("d1_1", &format!("{} tail two", shared), 1, vec![0.9, 0.1]),
                record("d1_2", "entirely different text", 2, vec![0.5, 0.5]),
            ])
            .await
            .unwrap();
        let embedder = MockEmbedder::new(2).pin("query", vec![1.0, 0.0]);

        let results = search(&store, &embedder, "query", 3, true).await;
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["d1_0", "d1_2"]);
    }

    #[test]
    fn test_rerank_sorts_descending_and_truncates() {
        let input = vec![
            result("a", "text a", 0.2, 1),
            result("b", "text b", 0.9, 2),
            result("c", "text c", 0.5, 3),
            result("d", "text d", 0.7, 4),
        ];
        let out = rerank_results(input, 3);
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "c"]);
    }

    #[test]
    fn test_rerank_stable_on_ties() {
        let input = vec![
            result("first", "alpha", 0.5, 1),
            result("second", "beta", 0.5, 2),
        ];
        let out = rerank_results(input, 2);
        assert_eq!(out[0].id, "first");
        assert_eq!(out[1].id, "second");
    }

    #[test]
    fn test_rerank_no_first_100_char_collisions_survive() {
        let shared: String = "y".repeat(100);
        let input = vec![
            result("a", &format!("{} one", shared), 0.3, 1),
            result("b", &format!("{} two", shared), 0.9, 2),
        ];
        let out = rerank_results(input, 10);
        // First occurrence wins even when a later duplicate scores higher.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a");
    }
}

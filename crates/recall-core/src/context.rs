//! LLM-ready context assembly.
//!
//! Converts ranked search results into a formatted context string under a
//! fixed header, optionally expanding each hit with its immediate preceding
//! sibling chunk for continuity. Both entry points are read-only over
//! search results and degrade to an empty string rather than failing —
//! callers treat empty context as "fall back to no-context prompting",
//! never as an error.
//!
//! Neighbor expansion is one-sided by design: only the chunk with
//! `chunk_num == anchor.chunk_num - 1` in the same document is inlined,
//! rendered immediately before its anchor and not counted toward `top_k`.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::embedding::Embedder;
use crate::models::SearchResult;
use crate::search::search;
use crate::store::{StoredChunk, VectorStore};

const CONTEXT_HEADER: &str = "=== RELEVANT CONTEXT ===\n";

/// Build a context string from the best `top_k` chunks for `query`,
/// dropping results below `min_relevance`.
///
/// Returns an empty string when nothing survives the filter.
pub async fn build_context<S, E>(
    store: &S,
    embedder: &E,
    query: &str,
    top_k: usize,
    min_relevance: f64,
) -> String
where
    S: VectorStore + ?Sized,
    E: Embedder + ?Sized,
{
    let results = search(store, embedder, query, top_k, true).await;
    let relevant: Vec<&SearchResult> = results
        .iter()
        .filter(|r| r.relevance >= min_relevance)
        .collect();

    if relevant.is_empty() {
        return String::new();
    }

    debug!(chunks = relevant.len(), "context assembled");
    render(&relevant, None)
}

/// Build a context string with each hit optionally preceded by its previous
/// document-local chunk.
pub async fn build_expanded_context<S, E>(
    store: &S,
    embedder: &E,
    query: &str,
    top_k: usize,
    include_neighbors: bool,
) -> String
where
    S: VectorStore + ?Sized,
    E: Embedder + ?Sized,
{
    let results = search(store, embedder, query, top_k, true).await;
    if results.is_empty() {
        return String::new();
    }
    let anchors: Vec<&SearchResult> = results.iter().collect();

    if !include_neighbors {
        return render(&anchors, None);
    }

    // One full listing per call; neighbor lookup is by (document, ordinal).
    let listing = match store.get_all().await {
        Ok(listing) => listing,
        Err(err) => {
            warn!(error = %err, "neighbor listing failed; rendering without neighbors");
            return render(&anchors, None);
        }
    };

    let by_position: HashMap<(&str, i64), &StoredChunk> = listing
        .iter()
        .map(|c| ((c.metadata.document_id.as_str(), c.metadata.chunk_num), c))
        .collect();

    debug!(anchors = anchors.len(), "context expanded with neighbors");
    render(&anchors, Some(&by_position))
}

/// Render anchors (and their preceding neighbors, when a position index is
/// supplied) as numbered blocks under the fixed header. Neighbor blocks are
/// annotated distinctly and never numbered.
fn render(
    anchors: &[&SearchResult],
    neighbors: Option<&HashMap<(&str, i64), &StoredChunk>>,
) -> String {
    let mut parts = vec![CONTEXT_HEADER.to_string()];

    for (i, anchor) in anchors.iter().enumerate() {
        if let Some(index) = neighbors {
            if let Some(prev) = index.get(&(anchor.document_id.as_str(), anchor.chunk_num - 1)) {
                parts.push(format!(
                    "[neighbor] {} (page {})",
                    prev.metadata.source, prev.metadata.page
                ));
                parts.push(format!("{}\n", prev.text));
            }
        }

        parts.push(format!(
            "[{}] {} (page {}, relevance: {:.2}%)",
            i + 1,
            anchor.source,
            anchor.page,
            anchor.relevance * 100.0
        ));
        parts.push(format!("{}\n", anchor.text));
    }

    parts.join("\n")
}

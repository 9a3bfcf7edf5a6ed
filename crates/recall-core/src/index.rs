//! Document indexing pipeline.
//!
//! Normalizes text, chunks it under the configured strategy, requests one
//! batched embedding call for all chunks, and upserts the chunk records
//! into the vector store as one batch.
//!
//! This is the write path: failures surface as [`IndexError`] instead of
//! degrading, because a silently half-indexed document corrupts every later
//! search. Partial writes are not rolled back — a caller that retries
//! should [`delete_document`](crate::lifecycle::delete_document) first.

use anyhow::anyhow;
use tracing::{debug, info};

use crate::chunk::{chunk_text, normalize_text, ChunkingParams};
use crate::embedding::Embedder;
use crate::error::IndexError;
use crate::models::{ChunkMetadata, ChunkRecord};
use crate::store::VectorStore;

/// Inputs for a single `add_document` invocation.
#[derive(Debug, Clone)]
pub struct AddDocument<'a> {
    /// Stable document identifier (typically derived from the source name).
    pub document_id: &'a str,
    /// Raw document text, prior to normalization.
    pub text: &'a str,
    /// Display name of the source (e.g. the uploaded file name).
    pub source: &'a str,
    /// Page number, 0 when the document is indexed whole.
    pub page: i64,
    /// Caller-supplied metadata, merged into each chunk's record.
    pub extra: Option<serde_json::Value>,
}

/// What indexing produced: the chunk count and the store ids written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutcome {
    pub chunk_count: usize,
    pub chunk_ids: Vec<String>,
}

/// Index one document into the vector store.
///
/// Chunk ids are `"{document_id}_{chunk_num}"`, unique across the store as
/// long as document ids are. A document that chunks to nothing (e.g. all
/// whitespace) short-circuits to an empty outcome without touching the
/// embedder or the store.
pub async fn add_document<S, E>(
    store: &S,
    embedder: &E,
    chunking: &ChunkingParams,
    req: &AddDocument<'_>,
) -> Result<IndexOutcome, IndexError>
where
    S: VectorStore + ?Sized,
    E: Embedder + ?Sized,
{
    let text = normalize_text(req.text);
    let chunks = chunk_text(&text, chunking.strategy, chunking.size, chunking.overlap);

    if chunks.is_empty() {
        debug!(source = req.source, "document produced no chunks");
        return Ok(IndexOutcome {
            chunk_count: 0,
            chunk_ids: Vec::new(),
        });
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder
        .embed(&texts)
        .await
        .map_err(IndexError::Embedding)?;

    if vectors.len() != chunks.len() {
        return Err(IndexError::Embedding(anyhow!(
            "embedding batch returned {} vectors for {} chunks",
            vectors.len(),
            chunks.len()
        )));
    }

    let created_at = now_iso();
    let records: Vec<ChunkRecord> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, vector)| ChunkRecord {
            id: format!("{}_{}", req.document_id, chunk.chunk_num),
            text: chunk.text,
            vector,
            metadata: ChunkMetadata {
                document_id: req.document_id.to_string(),
                source: req.source.to_string(),
                page: req.page,
                chunk_num: chunk.chunk_num,
                model: embedder.model_name().to_string(),
                created_at: created_at.clone(),
                extra: req.extra.clone().unwrap_or_else(|| serde_json::json!({})),
            },
        })
        .collect();

    store.upsert(&records).await.map_err(IndexError::Store)?;

    let chunk_ids: Vec<String> = records.into_iter().map(|r| r.id).collect();
    info!(
        source = req.source,
        chunks = chunk_ids.len(),
        "document indexed"
    );

    Ok(IndexOutcome {
        chunk_count: chunk_ids.len(),
        chunk_ids,
    })
}

/// Current time as ISO 8601.
fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

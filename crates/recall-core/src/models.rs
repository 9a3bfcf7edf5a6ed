//! Core data models used throughout Recall.
//!
//! These types represent the chunks, metadata records, and search results
//! that flow through the indexing and retrieval pipeline. The vector store
//! is the sole owner of persisted chunk records; everything the retrieval
//! side hands back to callers is a transient, derived view.

use serde::{Deserialize, Serialize};

/// A contiguous slice of a document's text produced by the chunker.
///
/// Chunk ids are deterministic hashes (content or position based, depending
/// on strategy), so the chunker itself never owns a vector — it only names
/// and orders text slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    /// 0-based ordinal within the source document. Contiguous per document.
    pub chunk_num: i64,
}

/// Typed per-chunk metadata stored alongside each vector.
///
/// A fixed record rather than a free-form map, so the writer and reader
/// cannot silently drift apart on field names. Caller-supplied metadata
/// rides along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_id: String,
    pub source: String,
    pub page: i64,
    pub chunk_num: i64,
    /// Name of the embedding model that produced this chunk's vector.
    pub model: String,
    /// ISO 8601 timestamp of indexing time.
    pub created_at: String,
    #[serde(default)]
    pub extra: serde_json::Value,
}

/// Write-side shape for a single chunk: the only place outside the vector
/// store where a vector and its text travel together.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// A search result mapped from a raw store candidate. Ephemeral, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub text: String,
    /// Raw cosine distance from the store, `>= 0`.
    pub distance: f64,
    /// `1 - distance`. Monotonically non-increasing in `rank` within one
    /// raw query result, before rerank.
    pub relevance: f64,
    pub source: String,
    pub page: i64,
    pub chunk_num: i64,
    pub document_id: String,
    /// 1-based position in the raw candidate list, before rerank.
    pub rank: usize,
}

/// Read-only snapshot of the store, for `stats`-style reporting.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_chunks: usize,
    pub model: String,
    pub store_path: String,
    pub timestamp: String,
}

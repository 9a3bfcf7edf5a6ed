//! Vector store abstraction.
//!
//! The [`VectorStore`] trait defines every storage operation the retrieval
//! pipeline needs, enabling pluggable backends (SQLite in the app crate,
//! in-memory here for tests and embedded use).
//!
//! The store is the sole owner of persisted chunk records — text, typed
//! metadata, and vector — for the lifetime of the system. Read-side shapes
//! ([`QueryHit`], [`StoredChunk`]) never expose vectors.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChunkMetadata, ChunkRecord};

/// A candidate returned from a nearest-neighbor query.
///
/// Candidates arrive ordered ascending by `distance` (the store's cosine
/// distance metric, `>= 0`).
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub id: String,
    pub text: String,
    pub distance: f64,
    pub metadata: ChunkMetadata,
}

/// A stored chunk without its vector, as returned by listing operations.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Abstract vector store backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert`](VectorStore::upsert) | Insert or replace a batch of chunk records |
/// | [`query`](VectorStore::query) | k nearest chunks by cosine distance, ascending |
/// | [`get_all`](VectorStore::get_all) | Full listing (neighbor expansion) |
/// | [`get_by_document`](VectorStore::get_by_document) | All chunks of one document |
/// | [`delete`](VectorStore::delete) | Delete chunks by id |
/// | [`count`](VectorStore::count) | Total chunk count |
/// | [`clear`](VectorStore::clear) | Drop and recreate the collection |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace chunk records by id, as one batch.
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<()>;

    /// Return the `k` nearest chunks to `vector`, ordered ascending by
    /// cosine distance.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryHit>>;

    /// Return every stored chunk (no vectors).
    async fn get_all(&self) -> Result<Vec<StoredChunk>>;

    /// Return all chunks whose metadata `document_id` matches.
    async fn get_by_document(&self, document_id: &str) -> Result<Vec<StoredChunk>>;

    /// Delete chunks by id. Unknown ids are ignored.
    async fn delete(&self, ids: &[String]) -> Result<()>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize>;

    /// Destroy and recreate the collection, dropping every document's
    /// chunks unconditionally.
    async fn clear(&self) -> Result<()>;
}

//! Deterministic collaborator doubles shared by the crate's unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::embedding::Embedder;
use crate::models::ChunkRecord;
use crate::store::{QueryHit, StoredChunk, VectorStore};

/// Embedder returning fixed vectors for pinned texts and a deterministic
/// hash-derived direction for everything else. Counts batch calls.
pub(crate) struct MockEmbedder {
    dims: usize,
    pinned: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub(crate) fn new(dims: usize) -> Self {
        Self {
            dims,
            pinned: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Pin an exact vector for an exact (normalized) text.
    pub(crate) fn pin(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.pinned.insert(text.to_string(), vector);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        if let Some(v) = self.pinned.get(text) {
            return v.clone();
        }
        let digest = Sha256::digest(text.as_bytes());
        let mut v: Vec<f32> = digest
            .iter()
            .cycle()
            .take(self.dims)
            .map(|&b| f32::from(b) / 255.0 + 0.01)
            .collect();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn model_name(&self) -> &str {
        "mock-embedder"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

/// Embedder that fails every call.
pub(crate) struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing-embedder"
    }

    fn dims(&self) -> usize {
        0
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("embedding backend unavailable")
    }
}

/// Store that fails every operation.
pub(crate) struct FailingStore;

#[async_trait]
impl VectorStore for FailingStore {
    async fn upsert(&self, _records: &[ChunkRecord]) -> Result<()> {
        bail!("store unavailable")
    }

    async fn query(&self, _vector: &[f32], _k: usize) -> Result<Vec<QueryHit>> {
        bail!("store unavailable")
    }

    async fn get_all(&self) -> Result<Vec<StoredChunk>> {
        bail!("store unavailable")
    }

    async fn get_by_document(&self, _document_id: &str) -> Result<Vec<StoredChunk>> {
        bail!("store unavailable")
    }

    async fn delete(&self, _ids: &[String]) -> Result<()> {
        bail!("store unavailable")
    }

    async fn count(&self) -> Result<usize> {
        bail!("store unavailable")
    }

    async fn clear(&self) -> Result<()> {
        bail!("store unavailable")
    }
}

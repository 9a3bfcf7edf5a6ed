//! In-memory [`VectorStore`] implementation.
//!
//! Uses a `Vec` behind `std::sync::RwLock` for thread safety. Query is
//! brute-force cosine distance over all stored vectors. Suitable for tests
//! and small embedded corpora; the SQLite store in the app crate is the
//! persistent backend.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::embedding::cosine_distance;
use crate::models::ChunkRecord;

use super::{QueryHit, StoredChunk, VectorStore};

/// In-memory store for tests and embedded use.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<ChunkRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<()> {
        let mut stored = self.records.write().unwrap();
        for record in records {
            stored.retain(|r| r.id != record.id);
            stored.push(record.clone());
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        let stored = self.records.read().unwrap();
        let mut hits: Vec<QueryHit> = stored
            .iter()
            .map(|r| QueryHit {
                id: r.id.clone(),
                text: r.text.clone(),
                distance: cosine_distance(vector, &r.vector),
                metadata: r.metadata.clone(),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn get_all(&self) -> Result<Vec<StoredChunk>> {
        let stored = self.records.read().unwrap();
        Ok(stored
            .iter()
            .map(|r| StoredChunk {
                id: r.id.clone(),
                text: r.text.clone(),
                metadata: r.metadata.clone(),
            })
            .collect())
    }

    async fn get_by_document(&self, document_id: &str) -> Result<Vec<StoredChunk>> {
        let stored = self.records.read().unwrap();
        Ok(stored
            .iter()
            .filter(|r| r.metadata.document_id == document_id)
            .map(|r| StoredChunk {
                id: r.id.clone(),
                text: r.text.clone(),
                metadata: r.metadata.clone(),
            })
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        let mut stored = self.records.write().unwrap();
        stored.retain(|r| !ids.contains(&r.id));
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().unwrap().len())
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChunkMetadata;

    fn record(id: &str, doc: &str, chunk_num: i64, vector: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            text: format!("text of {}", id),
            vector,
            metadata: ChunkMetadata {
                document_id: doc.to_string(),
                source: "test.pdf".to_string(),
                page: 0,
                chunk_num,
                model: "mock".to_string(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
                extra: serde_json::json!({}),
            },
        }
    }

    #[tokio::test]
    async fn test_query_orders_by_distance_ascending() {
        let store = InMemoryStore::new();
        store
            .upsert(&[
                record("far", "d1", 0, vec![0.0, 1.0]),
                record("near", "d1", 1, vec![1.0, 0.0]),
                record("mid", "d1", 2, vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = store.query(&[1.0, 0.0], 3).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
    }

    #[tokio::test]
    async fn test_query_truncates_to_k() {
        let store = InMemoryStore::new();
        store
            .upsert(&[
                record("a", "d1", 0, vec![1.0, 0.0]),
                record("b", "d1", 1, vec![0.9, 0.1]),
                record("c", "d1", 2, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = InMemoryStore::new();
        store
            .upsert(&[record("a", "d1", 0, vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert(&[record("a", "d2", 0, vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let all = store.get_all().await.unwrap();
        assert_eq!(all[0].metadata.document_id, "d2");
    }

    #[tokio::test]
    async fn test_get_by_document_and_delete() {
        let store = InMemoryStore::new();
        store
            .upsert(&[
                record("a", "d1", 0, vec![1.0, 0.0]),
                record("b", "d1", 1, vec![0.5, 0.5]),
                record("c", "d2", 0, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let d1 = store.get_by_document("d1").await.unwrap();
        assert_eq!(d1.len(), 2);

        let ids: Vec<String> = d1.iter().map(|c| c.id.clone()).collect();
        store.delete(&ids).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get_by_document("d1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let store = InMemoryStore::new();
        store
            .upsert(&[record("a", "d1", 0, vec![1.0, 0.0])])
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.query(&[1.0, 0.0], 5).await.unwrap().is_empty());
    }
}

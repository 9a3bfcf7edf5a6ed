//! SQLite-backed [`VectorStore`] implementation.
//!
//! One `chunks` table holds each chunk's id, text, typed metadata columns,
//! and embedding (a little-endian f32 BLOB). Vector queries are a
//! brute-force scan: decode every stored vector, compute cosine distance,
//! sort ascending, truncate. For the single-document-at-a-time corpora this
//! system targets, a full scan stays fast and keeps the schema free of
//! extension dependencies.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use recall_core::embedding::{blob_to_vec, cosine_distance, vec_to_blob};
use recall_core::models::{ChunkMetadata, ChunkRecord};
use recall_core::store::{QueryHit, StoredChunk, VectorStore};

use crate::migrate;

/// SQLite implementation of the [`VectorStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_metadata(row: &sqlx::sqlite::SqliteRow) -> ChunkMetadata {
    let extra_json: String = row.get("extra_json");
    ChunkMetadata {
        document_id: row.get("document_id"),
        source: row.get("source"),
        page: row.get("page"),
        chunk_num: row.get("chunk_num"),
        model: row.get("model"),
        created_at: row.get("created_at"),
        extra: serde_json::from_str(&extra_json).unwrap_or(serde_json::json!({})),
    }
}

fn row_to_stored_chunk(row: &sqlx::sqlite::SqliteRow) -> StoredChunk {
    StoredChunk {
        id: row.get("id"),
        text: row.get("text"),
        metadata: row_to_metadata(row),
    }
}

const CHUNK_COLUMNS: &str =
    "id, document_id, source, page, chunk_num, model, created_at, extra_json, text";

#[async_trait]
impl VectorStore for SqliteStore {
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            let extra_json = serde_json::to_string(&record.metadata.extra)?;
            let blob = vec_to_blob(&record.vector);
            sqlx::query(
                r#"
                INSERT INTO chunks (id, document_id, source, page, chunk_num,
                                    model, created_at, extra_json, text, embedding)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    document_id = excluded.document_id,
                    source = excluded.source,
                    page = excluded.page,
                    chunk_num = excluded.chunk_num,
                    model = excluded.model,
                    created_at = excluded.created_at,
                    extra_json = excluded.extra_json,
                    text = excluded.text,
                    embedding = excluded.embedding
                "#,
            )
            .bind(&record.id)
            .bind(&record.metadata.document_id)
            .bind(&record.metadata.source)
            .bind(record.metadata.page)
            .bind(record.metadata.chunk_num)
            .bind(&record.metadata.model)
            .bind(&record.metadata.created_at)
            .bind(&extra_json)
            .bind(&record.text)
            .bind(&blob)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, embedding FROM chunks",
            CHUNK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut hits: Vec<QueryHit> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let stored = blob_to_vec(&blob);
                QueryHit {
                    id: row.get("id"),
                    text: row.get("text"),
                    distance: cosine_distance(vector, &stored),
                    metadata: row_to_metadata(row),
                }
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
        let rows = sqlx::query(&format!(
            "SELECT {} FROM chunks ORDER BY document_id, chunk_num",
            CHUNK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_stored_chunk).collect())
    }

    async fn get_by_document(&self, document_id: &str) -> Result<Vec<StoredChunk>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM chunks WHERE document_id = ? ORDER BY chunk_num",
            CHUNK_COLUMNS
        ))
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_stored_chunk).collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("DELETE FROM chunks WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn clear(&self) -> Result<()> {
        // Drop and recreate the collection, mirroring a vector database's
        // delete-collection + create-collection cycle.
        sqlx::query("DROP TABLE IF EXISTS chunks")
            .execute(&self.pool)
            .await?;
        migrate::run_migrations(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DbConfig};

    async fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            db: DbConfig {
                path: dir.path().join("recall.sqlite"),
            },
            chunking: Default::default(),
            retrieval: Default::default(),
            embedding: Default::default(),
        };
        let pool = crate::db::connect(&config).await.unwrap();
        migrate::run_migrations(&pool).await.unwrap();
        (dir, SqliteStore::new(pool))
    }

    fn record(id: &str, doc: &str, chunk_num: i64, vector: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            text: format!("text of {}", id),
            vector,
            metadata: ChunkMetadata {
                document_id: doc.to_string(),
                source: "manual.pdf".to_string(),
                page: 3,
                chunk_num,
                model: "test-model".to_string(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
                extra: serde_json::json!({"lang": "en"}),
            },
        }
    }

    #[tokio::test]
    async fn test_upsert_and_query_roundtrip() {
        let (_dir, store) = test_store().await;
        store
            .upsert(&[
                record("d1_0", "d1", 0, vec![1.0, 0.0]),
                record("d1_1", "d1", 1, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = store.query(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "d1_0");
        assert!(hits[0].distance < hits[1].distance);
        assert_eq!(hits[0].metadata.source, "manual.pdf");
        assert_eq!(hits[0].metadata.page, 3);
        assert_eq!(hits[0].metadata.extra["lang"], "en");
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_id() {
        let (_dir, store) = test_store().await;
        store
            .upsert(&[record("d1_0", "d1", 0, vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert(&[record("d1_0", "d9", 0, vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let all = store.get_all().await.unwrap();
        assert_eq!(all[0].metadata.document_id, "d9");
    }

    #[tokio::test]
    async fn test_get_by_document_ordered_by_chunk_num() {
        let (_dir, store) = test_store().await;
        store
            .upsert(&[
                record("d1_2", "d1", 2, vec![1.0, 0.0]),
                record("d1_0", "d1", 0, vec![1.0, 0.0]),
                record("d1_1", "d1", 1, vec![1.0, 0.0]),
                record("d2_0", "d2", 0, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let chunks = store.get_by_document("d1").await.unwrap();
        let nums: Vec<i64> = chunks.iter().map(|c| c.metadata.chunk_num).collect();
        assert_eq!(nums, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let (_dir, store) = test_store().await;
        store
            .upsert(&[
                record("d1_0", "d1", 0, vec![1.0, 0.0]),
                record("d1_1", "d1", 1, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        store
            .delete(&["d1_0".to_string(), "unknown".to_string()])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_recreates_empty_collection() {
        let (_dir, store) = test_store().await;
        store
            .upsert(&[record("d1_0", "d1", 0, vec![1.0, 0.0])])
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        // The collection is usable again after the drop-and-recreate cycle.
        store
            .upsert(&[record("d1_0", "d1", 0, vec![1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }
}

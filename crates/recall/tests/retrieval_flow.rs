//! End-to-end retrieval flow over the SQLite store with a deterministic
//! mock embedder: index → search → context → delete.

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;

use recall::config::{ChunkingConfig, Config, DbConfig};
use recall::sqlite_store::SqliteStore;
use recall::{db, migrate};
use recall_core::chunk::ChunkStrategy;
use recall_core::context::{build_context, build_expanded_context};
use recall_core::embedding::Embedder;
use recall_core::index::{add_document, AddDocument};
use recall_core::lifecycle;
use recall_core::search::search;

/// Embeds text as normalized keyword counts, so queries about one topic
/// land near the chunks mentioning it. Deterministic and offline.
struct ToyEmbedder;

const TOPICS: [&str; 3] = ["cat", "dog", "fish"];

impl ToyEmbedder {
    fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = TOPICS
            .iter()
            .map(|topic| lower.matches(topic).count() as f32 + 0.01)
            .collect();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl Embedder for ToyEmbedder {
    fn model_name(&self) -> &str {
        "toy-embedder"
    }

    fn dims(&self) -> usize {
        TOPICS.len()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

async fn setup_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().unwrap();
    let config = Config {
        db: DbConfig {
            path: dir.path().join("recall.sqlite"),
        },
        chunking: ChunkingConfig {
            strategy: ChunkStrategy::Sentence,
            size: 1,
            overlap: 0,
        },
        retrieval: Default::default(),
        embedding: Default::default(),
    };
    let pool = db::connect(&config).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    (dir, SqliteStore::new(pool))
}

fn chunking() -> recall_core::chunk::ChunkingParams {
    recall_core::chunk::ChunkingParams {
        strategy: ChunkStrategy::Sentence,
        size: 1,
        overlap: 0,
    }
}

const DOCUMENT: &str =
    "Cats purr when they are content. Dogs bark at strangers. Fish swim in schools.";

async fn index_document(store: &SqliteStore) -> recall_core::index::IndexOutcome {
    add_document(
        store,
        &ToyEmbedder,
        &chunking(),
        &AddDocument {
            document_id: "doc1",
            text: DOCUMENT,
            source: "animals.txt",
            page: 0,
            extra: None,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_index_then_search_finds_the_right_chunk() {
    let (_dir, store) = setup_store().await;
    let outcome = index_document(&store).await;
    assert_eq!(outcome.chunk_count, 3);
    assert_eq!(outcome.chunk_ids, vec!["doc1_0", "doc1_1", "doc1_2"]);

    let results = search(&store, &ToyEmbedder, "why do cats purr", 2, true).await;
    assert!(!results.is_empty());
    assert!(results[0].text.contains("Cats purr"));
    assert!(results[0].relevance > results.last().unwrap().relevance - 1e-9);
    assert!(results.len() <= 2);
}

#[tokio::test]
async fn test_context_renders_and_respects_threshold() {
    let (_dir, store) = setup_store().await;
    index_document(&store).await;

    let context = build_context(&store, &ToyEmbedder, "tell me about dogs", 2, 0.0).await;
    assert!(context.starts_with("=== RELEVANT CONTEXT ==="));
    assert!(context.contains("Dogs bark at strangers."));
    assert!(context.contains("animals.txt"));

    // A threshold above any attainable relevance always yields nothing.
    let empty = build_context(&store, &ToyEmbedder, "tell me about dogs", 2, 1.1).await;
    assert_eq!(empty, "");
}

#[tokio::test]
async fn test_expanded_context_inlines_preceding_chunk() {
    let (_dir, store) = setup_store().await;
    index_document(&store).await;

    let context = build_expanded_context(&store, &ToyEmbedder, "dogs barking", 1, true).await;
    let neighbor = context.find("Cats purr").expect("preceding chunk inlined");
    let anchor = context.find("Dogs bark").expect("anchor present");
    assert!(neighbor < anchor);
    assert!(context.contains("[neighbor]"));
}

#[tokio::test]
async fn test_delete_document_is_idempotent() {
    let (_dir, store) = setup_store().await;
    index_document(&store).await;

    assert_eq!(lifecycle::delete_document(&store, "doc1").await, 3);
    assert_eq!(lifecycle::delete_document(&store, "doc1").await, 0);

    let results = search(&store, &ToyEmbedder, "cats", 3, true).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_reindexing_replaces_rather_than_duplicates() {
    let (_dir, store) = setup_store().await;
    index_document(&store).await;
    index_document(&store).await;

    let stats = lifecycle::stats(&store, "toy-embedder", "test").await.unwrap();
    assert_eq!(stats.total_chunks, 3);
}

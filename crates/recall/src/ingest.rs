//! Ingestion flow for `rcl add`.
//!
//! Extract → replace previous chunks for the same document id → normalize,
//! chunk, embed, and upsert via the core indexing pipeline. The document id
//! is derived from the source name, so re-adding the same file replaces its
//! previous chunks instead of accumulating duplicates.
//!
//! Indexing failures surface loudly (exit non-zero): a partially indexed
//! document may exist after a failure, and retrying `add` after the
//! automatic delete is the recovery path.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use recall_core::index::{add_document, AddDocument};
use recall_core::lifecycle;

use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::extract::{self, document_id_for_source};
use crate::sqlite_store::SqliteStore;

pub async fn run_add(
    config: &Config,
    path: &Path,
    source_override: Option<String>,
    page: i64,
) -> Result<()> {
    let source = source_override.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    });

    let text = extract::extract_text(path)?;
    let document_id = document_id_for_source(&source);

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let embedder = embedding::create_embedder(&config.embedding)?;

    let replaced = lifecycle::delete_document(&store, &document_id).await;
    if replaced > 0 {
        info!(source = %source, replaced, "replacing previously indexed document");
    }

    let outcome = add_document(
        &store,
        embedder.as_ref(),
        &config.chunking.params(),
        &AddDocument {
            document_id: &document_id,
            text: &text,
            source: &source,
            page,
            extra: None,
        },
    )
    .await?;

    println!("add {}", source);
    println!("  document id: {}", document_id);
    println!("  characters: {}", text.len());
    println!("  chunks indexed: {}", outcome.chunk_count);
    println!("ok");

    pool.close().await;
    Ok(())
}

//! Document lifecycle: deletion, full clear, and store statistics.
//!
//! Everything here is best-effort cleanup on the read side of the error
//! policy: a failed delete or stats snapshot logs a warning and recovers to
//! a zero/`None` result. These operations back user-visible "clear" actions
//! and must never block them.

use tracing::{info, warn};

use crate::models::StoreStats;
use crate::store::VectorStore;

/// Delete every chunk belonging to `document_id`. Returns the number of
/// chunks removed; 0 when the document is unknown or the store fails.
pub async fn delete_document<S>(store: &S, document_id: &str) -> usize
where
    S: VectorStore + ?Sized,
{
    match try_delete(store, document_id).await {
        Ok(count) => count,
        Err(err) => {
            warn!(error = %err, document_id, "delete failed; reporting 0 chunks removed");
            0
        }
    }
}

async fn try_delete<S>(store: &S, document_id: &str) -> anyhow::Result<usize>
where
    S: VectorStore + ?Sized,
{
    let chunks = store.get_by_document(document_id).await?;
    if chunks.is_empty() {
        return Ok(0);
    }

    let ids: Vec<String> = chunks.into_iter().map(|c| c.id).collect();
    store.delete(&ids).await?;
    info!(document_id, count = ids.len(), "document chunks removed");
    Ok(ids.len())
}

/// Destroy and recreate the entire collection, dropping every document's
/// chunks unconditionally. Failures are logged, not propagated.
pub async fn clear_all<S>(store: &S)
where
    S: VectorStore + ?Sized,
{
    match store.clear().await {
        Ok(()) => info!("store cleared"),
        Err(err) => warn!(error = %err, "clear failed"),
    }
}

/// Read-only store snapshot; `None` when the store cannot be reached.
pub async fn stats<S>(store: &S, model: &str, store_path: &str) -> Option<StoreStats>
where
    S: VectorStore + ?Sized,
{
    match store.count().await {
        Ok(total_chunks) => Some(StoreStats {
            total_chunks,
            model: model.to_string(),
            store_path: store_path.to_string(),
            timestamp: now_iso(),
        }),
        Err(err) => {
            warn!(error = %err, "stats snapshot failed");
            None
        }
    }
}

/// Current time as ISO 8601.
fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

//! Write-path error taxonomy.
//!
//! Indexing failures surface loudly: a half-indexed document silently
//! corrupts every later search, so `add_document` never swallows a
//! collaborator error. Read-path failures (search, context, lifecycle)
//! are handled where they occur and degrade to empty results instead.

use thiserror::Error;

/// A failure while indexing a document, carrying the underlying cause.
///
/// Partial writes are not rolled back: a failed `add_document` may have
/// written some chunks. Callers that retry should `delete_document` first.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The embedding collaborator failed or returned a malformed batch.
    #[error("embedding request failed: {0}")]
    Embedding(anyhow::Error),

    /// The vector store rejected the batch upsert.
    #[error("vector store write failed: {0}")]
    Store(anyhow::Error),
}

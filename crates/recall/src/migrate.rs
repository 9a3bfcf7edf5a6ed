use anyhow::Result;
use sqlx::SqlitePool;

/// Create the chunk collection schema. Idempotent; also used by
/// [`SqliteStore::clear`](crate::sqlite_store::SqliteStore) to recreate the
/// collection after dropping it.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            source TEXT NOT NULL,
            page INTEGER NOT NULL DEFAULT 0,
            chunk_num INTEGER NOT NULL,
            model TEXT NOT NULL,
            created_at TEXT NOT NULL,
            extra_json TEXT NOT NULL DEFAULT '{}',
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id)")
        .execute(pool)
        .await?;

    Ok(())
}

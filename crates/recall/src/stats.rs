//! Store statistics and health overview.
//!
//! Provides a quick summary of what's indexed: chunk count, embedding
//! model, database path and size. Used by `rcl stats` to give confidence
//! that uploads and embeddings are working as expected.

use anyhow::Result;

use recall_core::lifecycle;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Run the stats command: snapshot the store and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());

    let store_path = config.db.path.display().to_string();
    let snapshot = lifecycle::stats(&store, config.embedding.display_model(), &store_path).await;

    let snapshot = match snapshot {
        Some(s) => s,
        None => {
            println!("Stats unavailable.");
            pool.close().await;
            return Ok(());
        }
    };

    let db_size = std::fs::metadata(&config.db.path).map(|m| m.len()).unwrap_or(0);

    println!("Recall — Store Stats");
    println!("====================");
    println!();
    println!("  Database:   {}", snapshot.store_path);
    println!("  Size:       {}", format_bytes(db_size));
    println!();
    println!("  Chunks:     {}", snapshot.total_chunks);
    println!("  Model:      {}", snapshot.model);
    println!("  Snapshot:   {}", snapshot.timestamp);
    println!();

    pool.close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}

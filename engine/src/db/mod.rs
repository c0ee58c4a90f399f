//! SQLite connection pool and migrations
//!
//! Goals and the celebration record live in one on-device database file
//! under the configured data directory.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Open (creating if needed) the database file and build a pool over it
pub async fn create_pool(path: &Path, max_connections: u32) -> Result<SqlitePool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }

    let connect_options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(connect_options)
        .await
        .with_context(|| format!("opening database at {}", path.display()))?;

    info!(
        path = %path.display(),
        max_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creates_nested_database_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("frisky.db");

        let pool = create_pool(&path, 2).await.unwrap();
        run_migrations(&pool).await.unwrap();
        // Migrations are idempotent across restarts
        run_migrations(&pool).await.unwrap();
        health_check(&pool).await.unwrap();

        assert!(path.exists());
        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('goals', 'kv') ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(tables, vec!["goals".to_string(), "kv".to_string()]);
    }
}

//! SQLite pool construction and embedded schema migrations.

use anyhow::{Context, Result};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr, time::Duration};

/// Open (creating if missing) the SQLite database at `database_url`.
///
/// File-backed databases use WAL and a busy timeout so concurrent requests
/// serialize on the writer lock instead of failing immediately.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    tracing::debug!("Connecting using raw URL => {}", database_url);

    if let Some(parent) = file_parent(database_url) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {:?}", parent))?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("parsing database URL `{}`", database_url))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("connecting to {}", database_url))
}

/// Single-connection in-memory database with the schema applied.
///
/// Each SQLite in-memory connection is its own database, so the pool must
/// never open a second one.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("opening in-memory database")?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Apply the embedded migrations under `migrations/`. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("running database migrations")?;
    Ok(())
}

/// Local file path behind a `sqlite://` URL, if it names a file.
fn file_parent(database_url: &str) -> Option<&Path> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path).parent()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_parent_handles_memory_and_file_urls() {
        assert_eq!(file_parent("sqlite::memory:"), None);
        assert_eq!(
            file_parent("sqlite://./data/qubes-air.db"),
            Some(Path::new("./data"))
        );
        assert_eq!(
            file_parent("sqlite://data/qubes-air.db?mode=rwc"),
            Some(Path::new("data"))
        );
    }

    #[tokio::test]
    async fn in_memory_database_has_schema() {
        let pool = connect_in_memory().await.unwrap();
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('zones', 'qubes') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["qubes".to_string(), "zones".to_string()]);
    }
}

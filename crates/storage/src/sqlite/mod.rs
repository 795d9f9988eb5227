use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::Storage;

mod kv_repo;
mod migrate;

/// Settings and snapshots kept as JSON rows in one `kv_entries` table.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A private `sqlite::memory:` database exists per connection, so the pool
/// must not open a second one.
fn pool_size(database_url: &str) -> u32 {
    if database_url == "sqlite::memory:" { 1 } else { 4 }
}

fn is_file_backed(database_url: &str) -> bool {
    !database_url.contains(":memory:") && !database_url.contains("mode=memory")
}

impl SqliteRepository {
    /// Open the exam database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the pool cannot connect or a pragma fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let wal = is_file_backed(database_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size(database_url))
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if wal {
                        sqlx::query("PRAGMA journal_mode = WAL;")
                            .execute(&mut *conn)
                            .await?;
                    }
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        tracing::debug!(url = database_url, wal, "sqlite pool connected");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bring the schema up to the latest version.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration statement fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Settings and snapshot repositories sharing one migrated `SQLite` pool.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        Ok(Self::from_store(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_memory_databases_use_a_single_connection() {
        assert_eq!(pool_size("sqlite::memory:"), 1);
        assert_eq!(pool_size("sqlite:///tmp/exam.sqlite3"), 4);
        assert!(!is_file_backed("sqlite:file:memdb_a?mode=memory&cache=shared"));
        assert!(is_file_backed("sqlite:///tmp/exam.sqlite3"));
    }

    #[tokio::test]
    async fn memory_database_migrates() {
        let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
        repo.migrate().await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_entries")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}

use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

struct Migration {
    version: i64,
    statements: &'static [&'static str],
}

/// Schema history, oldest first. Append new versions; never edit applied ones.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    statements: &[r"
        CREATE TABLE IF NOT EXISTS kv_entries (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    "],
}];

async fn applied_version(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (version,): (Option<i64>,) = sqlx::query_as("SELECT MAX(version) FROM schema_migrations")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

/// Apply every migration newer than the recorded schema version, each in its
/// own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
        ",
    )
    .execute(pool)
    .await?;

    let current = applied_version(pool).await?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let mut tx = pool.begin().await?;
        for statement in migration.statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(migration.version)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(version = migration.version, "applied schema migration");
    }

    Ok(())
}

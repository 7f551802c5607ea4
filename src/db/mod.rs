mod models;

pub use models::*;

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    // Strip SQL comment lines (lines starting with --) before splitting
    // into statements; a ';' inside a comment is not a statement end.
    let cleaned: String = sql
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    for statement in cleaned.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("rosterd.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    info!("Initializing database at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;

    migrate(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// Run schema migrations. Public so tests can prepare in-memory databases.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    execute_sql(pool, include_str!("../../migrations/001_users.sql")).await?;
    execute_sql(pool, include_str!("../../migrations/002_sessions.sql")).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = memory_pool().await;

        migrate(&pool).await.unwrap();
        migrate(&pool).await.unwrap();

        sqlx::query("INSERT INTO users (id, name, email, contact, password_hash, is_admin, created_at, updated_at) VALUES ('u1', 'A', 'a@b.c', '1', 'h', 0, 't', 't')")
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn semicolons_in_comments_do_not_split_statements() {
        let pool = memory_pool().await;

        let sql = "-- first note; second note\n\
                   CREATE TABLE notes (id TEXT PRIMARY KEY);\n\
                   -- another; comment\n\
                   INSERT INTO notes (id) VALUES ('n1');\n";
        execute_sql(&pool, sql).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT count(*) FROM notes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}

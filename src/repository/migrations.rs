//! Versioned schema migrations for the SQLite store.
//!
//! Migrations are applied in ascending version order, each one inside its own
//! transaction together with the `schema_migrations` row that records it. A
//! failure leaves the database at the last fully applied version.

use chrono::Utc;
use sqlx::{Executor, SqlitePool};

use crate::error::{AppError, AppResult};

/// A single schema change
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    /// Forward statement(s)
    pub up: &'static str,
    /// Reverse statement(s), if the migration can be rolled back
    pub down: Option<&'static str>,
}

/// Schema history of the books database
pub fn book_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Create books table",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    author TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'to_read',
                    category TEXT,
                    notes TEXT,
                    start_date TEXT NOT NULL,
                    end_date TEXT
                );
            "#,
            down: Some("DROP TABLE IF EXISTS books;"),
        },
        Migration {
            version: 2,
            description: "Index books by status and category",
            up: r#"
                CREATE INDEX IF NOT EXISTS idx_books_status ON books (status);
                CREATE INDEX IF NOT EXISTS idx_books_category ON books (category);
            "#,
            down: Some(
                r#"
                DROP INDEX IF EXISTS idx_books_category;
                DROP INDEX IF EXISTS idx_books_status;
                "#,
            ),
        },
    ]
}

/// Applies and rolls back migrations against one database
#[derive(Clone)]
pub struct Migrator {
    pool: SqlitePool,
    migrations: Vec<Migration>,
}

impl Migrator {
    pub fn new(pool: SqlitePool, mut migrations: Vec<Migration>) -> Self {
        migrations.sort_by_key(|m| m.version);
        Self { pool, migrations }
    }

    /// Create the version tracking table if it does not exist yet
    pub async fn ensure_migrations_table(&self) -> AppResult<()> {
        self.pool
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS schema_migrations (
                    version INTEGER PRIMARY KEY,
                    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                );
                "#,
            )
            .await
            .map_err(|e| AppError::Migration(format!("failed to create migrations table: {}", e)))?;
        Ok(())
    }

    /// Highest recorded version, 0 when nothing is recorded or the table is missing
    pub async fn current_version(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0)
    }

    /// Apply every migration newer than the current version.
    ///
    /// Returns the number of migrations applied.
    pub async fn apply_pending(&self) -> AppResult<usize> {
        self.ensure_migrations_table().await?;

        let current = self.current_version().await;
        tracing::info!("Current database version: {}", current);

        let mut applied = 0;
        for migration in self.migrations.iter().filter(|m| m.version > current) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.description
            );
            self.apply(migration).await?;
            applied += 1;
            tracing::info!("Migration {} applied successfully", migration.version);
        }

        if applied == 0 {
            tracing::info!("All migrations up to date");
        }
        Ok(applied)
    }

    async fn apply(&self, migration: &Migration) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        (&mut *tx)
            .execute(migration.up)
            .await
            .map_err(|e| AppError::Migration(format!("migration {} failed: {}", migration.version, e)))?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
            .bind(migration.version)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Migration(format!(
                    "failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit().await?;
        Ok(())
    }

    /// Reverse the most recently applied migration.
    ///
    /// Returns the version that was rolled back.
    pub async fn rollback(&self) -> AppResult<i64> {
        let current = self.current_version().await;
        if current == 0 {
            return Err(AppError::Migration("no migrations to rollback".to_string()));
        }

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == current)
            .ok_or_else(|| AppError::Migration(format!("migration {} not found", current)))?;

        let down = migration.down.ok_or_else(|| {
            AppError::Migration(format!("migration {} cannot be rolled back", current))
        })?;

        tracing::info!(
            "Rolling back migration {}: {}",
            migration.version,
            migration.description
        );

        let mut tx = self.pool.begin().await?;

        (&mut *tx)
            .execute(down)
            .await
            .map_err(|e| AppError::Migration(format!("rollback of {} failed: {}", current, e)))?;

        sqlx::query("DELETE FROM schema_migrations WHERE version = ?")
            .bind(current)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Migration(format!("failed to remove migration record {}: {}", current, e))
            })?;

        tx.commit().await?;

        tracing::info!("Migration {} rolled back successfully", current);
        Ok(current)
    }
}

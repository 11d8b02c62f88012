//! Repository layer for book persistence

pub mod memory;
pub mod migrations;
pub mod sqlite;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::{
    config::DatabaseConfig,
    error::AppResult,
    models::{Book, BookFilter},
};

pub use memory::MemoryBookStore;
pub use migrations::{book_migrations, Migration, Migrator};
pub use sqlite::SqliteBookStore;

/// Persistence operations for books.
///
/// Implemented by [`SqliteBookStore`] and [`MemoryBookStore`]; services hold
/// the store as `Arc<dyn BookStore>`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every book, most recently created first
    async fn get_all(&self) -> AppResult<Vec<Book>>;

    async fn get_by_id(&self, id: i64) -> AppResult<Book>;

    /// Persist a new book. Any id on `book` is ignored; the returned book
    /// carries the store-assigned id.
    async fn create(&self, book: &Book) -> AppResult<Book>;

    /// Replace the row with the given id
    async fn update(&self, id: i64, book: &Book) -> AppResult<()>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Books matching every set filter field, in the filter's sort order
    async fn get_by_filters(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;
}

/// Open the SQLite database described by the configuration, creating the
/// file if needed
pub async fn connect(config: &DatabaseConfig) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.path)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Private in-memory database on a single long-lived connection
pub async fn memory_pool() -> AppResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

//! SQLite-backed book store

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::BookStore;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, SortBy},
};

const BOOK_COLUMNS: &str =
    "id, title, author, status, category, notes, start_date, end_date";

/// Timestamps are stored as RFC 3339 UTC text with fixed precision, so string
/// order in SQL equals chronological order.
pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(column: &str, value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("invalid {} '{}': {}", column, value, e)))
}

/// Persisted shape of a book
#[derive(Debug, FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    status: String,
    category: Option<String>,
    notes: Option<String>,
    start_date: String,
    end_date: Option<String>,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(row: BookRow) -> AppResult<Self> {
        let status = row.status.parse().map_err(|_| {
            AppError::Internal(format!("book {} has unknown status '{}'", row.id, row.status))
        })?;

        Ok(Book {
            id: row.id,
            title: row.title,
            author: row.author,
            status,
            category: row.category,
            notes: row.notes,
            start_date: decode_timestamp("start_date", &row.start_date)?,
            end_date: row
                .end_date
                .as_deref()
                .map(|v| decode_timestamp("end_date", v))
                .transpose()?,
        })
    }
}

fn into_books(rows: Vec<BookRow>) -> AppResult<Vec<Book>> {
    rows.into_iter().map(Book::try_from).collect()
}

#[derive(Clone)]
pub struct SqliteBookStore {
    pool: SqlitePool,
}

impl SqliteBookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn get_all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books ORDER BY id DESC",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        into_books(rows)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>(&format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?
            .try_into()
    }

    async fn create(&self, book: &Book) -> AppResult<Book> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, status, category, notes, start_date, end_date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.status.as_str())
        .bind(&book.category)
        .bind(&book.notes)
        .bind(encode_timestamp(&book.start_date))
        .bind(book.end_date.as_ref().map(encode_timestamp))
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created book id={}", id);
        Ok(Book { id, ..book.clone() })
    }

    async fn update(&self, id: i64, book: &Book) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = ?, author = ?, status = ?, category = ?, notes = ?, start_date = ?, end_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.status.as_str())
        .bind(&book.category)
        .bind(&book.notes)
        .bind(encode_timestamp(&book.start_date))
        .bind(book.end_date.as_ref().map(encode_timestamp))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    async fn get_by_filters(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM books WHERE 1=1", BOOK_COLUMNS));

        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(category) = &filter.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }

        builder.push(match filter.sort {
            SortBy::Title => " ORDER BY title ASC, id DESC",
            SortBy::Author => " ORDER BY author ASC, id DESC",
            SortBy::Date => " ORDER BY start_date DESC, id DESC",
            SortBy::Newest => " ORDER BY id DESC",
        });

        let rows = builder
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?;
        into_books(rows)
    }
}

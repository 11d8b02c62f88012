//! Book service: validation, defaults and the end date policy

use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, BookInput, BookStatus},
    repository::BookStore,
};

/// Current time at the precision the store persists
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// End date after moving a book to `status`.
///
/// Entering a terminal status stamps `now` only if the book has no end date
/// yet; leaving it for reading or to_read always clears it.
pub fn resolve_end_date(
    status: BookStatus,
    existing: &Book,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if status.is_terminal() && existing.end_date.is_none() {
        Some(now)
    } else if !status.is_terminal() {
        None
    } else {
        existing.end_date
    }
}

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Check title/author and parse the status; empty status means `to_read`
    fn validate(input: &BookInput) -> AppResult<BookStatus> {
        input.validate()?;

        match input.status.as_deref() {
            None | Some("") => Ok(BookStatus::default()),
            Some(s) => s
                .parse::<BookStatus>()
                .map_err(|e| AppError::Validation(e.to_string())),
        }
    }

    /// List books; with an empty filter this is the plain newest-first listing
    pub async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        if *filter == BookFilter::default() {
            self.store.get_all().await
        } else {
            self.store.get_by_filters(filter).await
        }
    }

    pub async fn get(&self, id: i64) -> AppResult<Book> {
        self.store.get_by_id(id).await
    }

    pub async fn create(&self, input: BookInput) -> AppResult<Book> {
        let status = Self::validate(&input)?;

        let book = Book {
            id: 0,
            title: input.title,
            author: input.author,
            status,
            category: non_empty(input.category),
            notes: non_empty(input.notes),
            start_date: now(),
            end_date: None,
        };

        let created = self.store.create(&book).await?;
        tracing::info!("Book {} created: {}", created.id, created.title);
        Ok(created)
    }

    /// Full replacement of a book. `start_date` is kept from the stored book
    /// and `end_date` follows [`resolve_end_date`].
    pub async fn update(&self, id: i64, input: BookInput) -> AppResult<Book> {
        let existing = self.store.get_by_id(id).await?;
        let status = Self::validate(&input)?;

        let book = Book {
            id,
            title: input.title,
            author: input.author,
            status,
            category: non_empty(input.category),
            notes: non_empty(input.notes),
            start_date: existing.start_date,
            end_date: resolve_end_date(status, &existing, now()),
        };

        self.store.update(id, &book).await?;
        tracing::info!("Book {} updated: status {} -> {}", id, existing.status, status);
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.store.delete(id).await?;
        tracing::info!("Book {} deleted", id);
        Ok(())
    }

    /// Insert sample books when the store is empty. Returns how many were added.
    pub async fn seed_if_empty(&self) -> AppResult<usize> {
        if !self.store.get_all().await?.is_empty() {
            return Ok(0);
        }

        tracing::info!("Seeding initial data");

        let samples = [
            BookInput {
                title: "Clean Code".to_string(),
                author: "Robert C. Martin".to_string(),
                status: Some(BookStatus::ToRead.to_string()),
                category: Some("Software Engineering".to_string()),
                notes: None,
            },
            BookInput {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                status: Some(BookStatus::Reading.to_string()),
                category: Some("Science Fiction".to_string()),
                notes: None,
            },
        ];

        let count = samples.len();
        for input in samples {
            self.create(input).await?;
        }
        Ok(count)
    }
}

//! In-memory book store

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::BookStore;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, SortBy},
};

#[derive(Debug)]
struct MemoryState {
    books: BTreeMap<i64, Book>,
    next_id: i64,
}

/// Book store kept entirely in process memory.
///
/// Ids come from a counter that only moves forward, so a deleted id is never
/// handed out again.
#[derive(Debug)]
pub struct MemoryBookStore {
    state: RwLock<MemoryState>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                books: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_books(books: &mut [Book], sort: SortBy) {
    // Secondary key everywhere: newest id first
    match sort {
        SortBy::Title => books.sort_by(|a, b| a.title.cmp(&b.title).then(b.id.cmp(&a.id))),
        SortBy::Author => books.sort_by(|a, b| a.author.cmp(&b.author).then(b.id.cmp(&a.id))),
        SortBy::Date => {
            books.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)))
        }
        SortBy::Newest => books.sort_by(|a, b| b.id.cmp(&a.id)),
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn get_all(&self) -> AppResult<Vec<Book>> {
        let state = self.state.read().await;
        Ok(state.books.values().rev().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        let state = self.state.read().await;
        state
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn create(&self, book: &Book) -> AppResult<Book> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;

        let created = Book { id, ..book.clone() };
        state.books.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, book: &Book) -> AppResult<()> {
        let mut state = self.state.write().await;
        match state.books.get_mut(&id) {
            Some(existing) => {
                *existing = Book { id, ..book.clone() };
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Book {} not found", id))),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn get_by_filters(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let state = self.state.read().await;
        let mut books: Vec<Book> = state
            .books
            .values()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect();
        sort_books(&mut books, filter.sort);
        Ok(books)
    }
}

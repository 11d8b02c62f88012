//! Data models for the Book Tracker

pub mod book;

// Re-export commonly used types
pub use book::{Book, BookFilter, BookInput, BookQuery, BookStatus, SortBy};

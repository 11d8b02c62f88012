//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Reading status of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    #[default]
    ToRead,
    Reading,
    Finished,
    Abandoned,
}

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::ToRead,
        BookStatus::Reading,
        BookStatus::Finished,
        BookStatus::Abandoned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::ToRead => "to_read",
            BookStatus::Reading => "reading",
            BookStatus::Finished => "finished",
            BookStatus::Abandoned => "abandoned",
        }
    }

    /// Terminal statuses carry an end date
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookStatus::Finished | BookStatus::Abandoned)
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string that is not one of the known values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status must be one of: to_read, reading, finished, abandoned")
    }
}

impl std::error::Error for InvalidStatus {}

impl FromStr for BookStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Store-assigned identifier
    pub id: i64,
    pub title: String,
    pub author: String,
    pub status: BookStatus,
    pub category: Option<String>,
    pub notes: Option<String>,
    /// Set when the book is created, never changed afterwards
    pub start_date: DateTime<Utc>,
    /// Present only for finished or abandoned books
    pub end_date: Option<DateTime<Utc>>,
}

/// A missing or `null` string field reads as empty
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Create / replace book request.
///
/// Server-managed fields (`id`, `start_date`, `end_date`) are not part of the
/// payload; unknown fields in the body are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    /// One of to_read, reading, finished, abandoned. Empty means `to_read`.
    pub status: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Sort order for book listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    Title,
    Author,
    /// Most recently started first
    Date,
    /// Most recently created first
    #[default]
    Newest,
}

impl SortBy {
    /// Unknown values fall back to newest first
    pub fn parse(value: &str) -> Self {
        match value {
            "title" => SortBy::Title,
            "author" => SortBy::Author,
            "date" => SortBy::Date,
            _ => SortBy::Newest,
        }
    }
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    /// title, author or date; anything else lists newest first
    pub sort: Option<String>,
}

/// Store-level listing filter. `None` fields are not applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    pub status: Option<BookStatus>,
    pub category: Option<String>,
    pub sort: SortBy,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        self.status.map_or(true, |s| book.status == s)
            && self
                .category
                .as_ref()
                .map_or(true, |c| book.category.as_deref() == Some(c.as_str()))
    }
}

impl TryFrom<BookQuery> for BookFilter {
    type Error = InvalidStatus;

    fn try_from(query: BookQuery) -> Result<Self, Self::Error> {
        let status = match query.status.as_deref() {
            None | Some("") => None,
            Some(s) => Some(s.parse()?),
        };

        Ok(Self {
            status,
            category: query.category.filter(|c| !c.is_empty()),
            sort: query.sort.as_deref().map(SortBy::parse).unwrap_or_default(),
        })
    }
}

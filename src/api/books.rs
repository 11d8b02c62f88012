//! Book endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, BookInput, BookQuery},
};

/// Parse the `{id}` path segment; anything but an integer is a client error
pub fn parse_book_id(raw: &str) -> AppResult<i64> {
    if raw.is_empty() {
        return Err(AppError::BadRequest("no ID provided".to_string()));
    }
    raw.parse()
        .map_err(|_| AppError::BadRequest("invalid ID format".to_string()))
}

fn list_query(query: Result<Query<BookQuery>, QueryRejection>) -> AppResult<BookQuery> {
    query.map(|Query(query)| query).map_err(|rejection| {
        tracing::debug!("Rejected list query: {}", rejection.body_text());
        AppError::BadRequest("invalid query parameters".to_string())
    })
}

fn json_body(payload: Result<Json<BookInput>, JsonRejection>) -> AppResult<BookInput> {
    payload.map(|Json(input)| input).map_err(|rejection| {
        tracing::debug!("Rejected book payload: {}", rejection.body_text());
        AppError::BadRequest("Invalid JSON format".to_string())
    })
}

/// List books, optionally filtered and sorted
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("status" = Option<String>, Query, description = "Only books with this status"),
        ("category" = Option<String>, Query, description = "Only books in this category"),
        ("sort" = Option<String>, Query, description = "title, author or date (default: newest first)")
    ),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>),
        (status = 400, description = "Invalid status filter or query string", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Book>>> {
    let query = list_query(query)?;
    let filter = BookFilter::try_from(query).map_err(|e| AppError::Validation(e.to_string()))?;
    let books = state.services.books.list(&filter).await?;
    Ok(Json(books))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid JSON or validation error", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let input = json_body(payload)?;
    let created = state.services.books.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Invalid ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let id = parse_book_id(&id)?;
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid ID, JSON or field values", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let id = parse_book_id(&id)?;
    let input = json_body(payload)?;
    let updated = state.services.books.update(id, input).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Invalid ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_book_id(&id)?;
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Anything below `/books/{id}/`; the id part is not a single integer
pub async fn nested_book_path() -> AppError {
    AppError::BadRequest("invalid ID format".to_string())
}

/// Paths no route matches
pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Any method a book route does not serve
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

//! API handlers for the Book Tracker REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    routing::{any, get, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// `/books` is served with and without the trailing slash
fn collection_routes() -> MethodRouter<AppState> {
    get(books::list_books)
        .post(books::create_book)
        .fallback(books::method_not_allowed)
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/books", collection_routes())
        .route("/books/", collection_routes())
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book)
                .fallback(books::method_not_allowed),
        )
        .route("/books/:id/*rest", any(books::nested_book_path))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(openapi::create_openapi_router())
        .fallback(books::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

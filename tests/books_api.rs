//! HTTP tests for the /books endpoints

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use booktracker::{
    api::create_router,
    repository::{self, book_migrations, BookStore, MemoryBookStore, Migrator, SqliteBookStore},
    services::Services,
    AppState,
};

fn app_with_store(store: Arc<dyn BookStore>) -> Router {
    create_router(AppState {
        services: Arc::new(Services::new(store)),
    })
}

fn memory_app() -> Router {
    app_with_store(Arc::new(MemoryBookStore::new()))
}

async fn sqlite_app() -> Router {
    let pool = repository::memory_pool().await.unwrap();
    Migrator::new(pool.clone(), book_migrations())
        .apply_pending()
        .await
        .unwrap();
    app_with_store(Arc::new(SqliteBookStore::new(pool)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_create_then_finish_scenario() {
    let app = sqlite_app().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"title": "Dune", "author": "Frank Herbert", "category": "SciFi"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "to_read");
    assert!(created["end_date"].is_null());
    assert_eq!(created["category"], "SciFi");
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(json!({"title": "Dune", "author": "Frank Herbert", "category": "SciFi", "status": "finished"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["status"], "finished");
    assert_eq!(updated["start_date"], created["start_date"]);

    let start: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(created["start_date"].clone()).unwrap();
    let end: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(updated["end_date"].clone()).unwrap();
    assert!(end >= start);

    let (status, fetched) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_client_cannot_set_server_fields() {
    let app = memory_app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({
            "id": 999,
            "title": "Emma",
            "author": "Jane Austen",
            "start_date": "1815-12-23T00:00:00Z",
            "end_date": "1816-01-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(created["id"], 999);
    assert_ne!(created["start_date"], "1815-12-23T00:00:00Z");
    assert!(created["end_date"].is_null());
}

#[tokio::test]
async fn test_validation_errors() {
    let app = memory_app();

    let (status, body) = send(&app, Method::POST, "/books", Some(json!({"author": "Nobody"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title is required");

    let (status, body) = send(&app, Method::POST, "/books", Some(json!({"title": "Untitled"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "author is required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"title": null, "author": "Frank Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title is required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"title": "Dune", "author": "Frank Herbert", "status": "someday"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("status must be one of"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Invalid JSON format");

    let (_, books) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn test_bad_ids_and_missing_books() {
    let app = memory_app();

    let (status, body) = send(&app, Method::GET, "/books/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid ID format");

    let (status, body) = send(&app, Method::GET, "/books/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::DELETE, "/books/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/books/7",
        Some(json!({"title": "Dune", "author": "Frank Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/books/x1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let (status, body) = send(&app, method, "/books/1/2", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid ID format");
    }

    let (status, body) = send(&app, Method::GET, "/shelves", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_book() {
    let app = sqlite_app().await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"title": "Dune", "author": "Frank Herbert"})),
    )
    .await;
    let uri = format!("/books/{}", created["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_and_sorting() {
    let app = sqlite_app().await;

    for (title, author, status, category) in [
        ("Neuromancer", "William Gibson", "reading", "SciFi"),
        ("Dune", "Frank Herbert", "reading", "SciFi"),
        ("Emma", "Jane Austen", "to_read", "Classic"),
        ("Beloved", "Toni Morrison", "finished", "Classic"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/books",
            Some(json!({"title": title, "author": author, "status": status, "category": category})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let titles = |books: &Value| -> Vec<String> {
        books
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, all) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&all), vec!["Beloved", "Emma", "Dune", "Neuromancer"]);

    let (_, reading) = send(&app, Method::GET, "/books?status=reading&category=&sort=title", None).await;
    assert_eq!(titles(&reading), vec!["Dune", "Neuromancer"]);

    let (_, classics) = send(&app, Method::GET, "/books?category=Classic&sort=author", None).await;
    assert_eq!(titles(&classics), vec!["Emma", "Beloved"]);

    let (_, unknown_sort) = send(&app, Method::GET, "/books/?sort=rating", None).await;
    assert_eq!(titles(&unknown_sort), titles(&all));

    let (status, body) = send(&app, Method::GET, "/books?status=someday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::GET, "/books?status=reading&status=finished", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid query parameters");
}

#[tokio::test]
async fn test_status_transitions_over_http() {
    let app = memory_app();

    let (_, created) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"title": "Dune", "author": "Frank Herbert", "status": "reading"})),
    )
    .await;
    let uri = format!("/books/{}", created["id"]);
    let put = |status: &str| json!({"title": "Dune", "author": "Frank Herbert", "status": status});

    let (_, finished) = send(&app, Method::PUT, &uri, Some(put("finished"))).await;
    assert!(finished["end_date"].is_string());

    let (_, abandoned) = send(&app, Method::PUT, &uri, Some(put("abandoned"))).await;
    assert_eq!(abandoned["end_date"], finished["end_date"]);

    let (_, reading) = send(&app, Method::PUT, &uri, Some(put("reading"))).await;
    assert!(reading["end_date"].is_null());
    assert_eq!(reading["start_date"], created["start_date"]);
}

#[tokio::test]
async fn test_method_not_allowed() {
    let app = memory_app();

    let (status, body) = send(&app, Method::PATCH, "/books", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");

    let (status, _) = send(&app, Method::POST, "/books/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_and_index() {
    let app = memory_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/books/{id}"));
}

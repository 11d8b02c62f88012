//! Health check and index endpoints

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Plain text overview of the API
pub async fn index() -> &'static str {
    concat!(
        "Book Tracker API\n\n",
        "Available Endpoints:\n",
        "  GET    /books       - List all books (?status=&category=&sort=title|author|date)\n",
        "  POST   /books       - Add new book\n",
        "  GET    /books/{id}  - Get specific book\n",
        "  PUT    /books/{id}  - Update book\n",
        "  DELETE /books/{id}  - Delete book\n",
        "  GET    /swagger-ui  - API documentation\n",
    )
}

//! Axum routers for the catalog endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::super::AppState;
use super::handlers::{create_course, get_course, list_courses};

/// Public course reads.
///
/// - `GET /` - published courses
/// - `GET /{id}` - course detail
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses))
        .route("/:id", get(get_course))
}

/// Educator endpoints (capability-checked).
///
/// - `POST /courses` - create a course
pub fn educator_routes() -> Router<AppState> {
    Router::new().route("/courses", post(create_course))
}

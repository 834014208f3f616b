//! Axum router for the user endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::super::AppState;
use super::handlers::{enrolled_courses, get_user_data, purchase_course, rate_course};

/// User API routes (all require caller identity).
///
/// - `GET /data` - profile, created on first interaction
/// - `GET /enrolled-courses` - the caller's enrollments
/// - `POST /purchase` - free enrollment or hosted checkout
/// - `POST /rating` - rate an enrolled course
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/data", get(get_user_data))
        .route("/enrolled-courses", get(enrolled_courses))
        .route("/purchase", post(purchase_course))
        .route("/rating", post(rate_course))
}
